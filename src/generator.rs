mod data;
mod feed;
mod utils;

use std::path::PathBuf;

use anyhow::Context as _;
use fs_extra::dir::CopyOptions;
use log::info;

use crate::{
    article::{article_path, Catalog},
    context::Context,
    language::Language,
    tree::ArticleFilter,
    views::{page_title, tag_path, ArticleView, HomeView, NotFound, RepositoryView},
};

use data::PageData;
use utils::{read_source, redirect_page, route_file, write_page};

fn generate_articles(ctx: &Context, catalog: &Catalog, language: Language) -> anyhow::Result<()> {
    for article in catalog.articles() {
        let route = article_path(article);
        let view = ArticleView::resolve(catalog, language, &article.url, |a| {
            read_source(&ctx.article_dir, language, a)
        });
        let title = view.title(&ctx.blog_name);
        let rel_path = route_file(&language.route(&route));
        match view {
            ArticleView::Found(found) => write_page(
                ctx,
                &rel_path,
                "article",
                &PageData::new(ctx, language, &route, title, found),
            )?,
            ArticleView::NotFound(not_found) => write_page(
                ctx,
                &rel_path,
                "not_found",
                &PageData::new(ctx, language, &route, title, not_found),
            )?,
        }
    }
    Ok(())
}

fn generate_repository(ctx: &Context, catalog: &Catalog, language: Language) -> anyhow::Result<()> {
    let repository_title = ctx.translations.get(language, "repository");

    let all = ArticleFilter::default();
    let route = "/repository/";
    let data = PageData::new(
        ctx,
        language,
        route,
        page_title(Some(repository_title.as_str()), &ctx.blog_name),
        RepositoryView::build(catalog, &all, language),
    );
    write_page(ctx, &route_file(&language.route(route)), "repository", &data)?;

    for tag in catalog.tags() {
        let filter = ArticleFilter::tag(&tag.name);
        let route = tag_path(&tag.name);
        let title = format!("{}: {}", ctx.translations.get(language, "tag"), tag.name);
        let data = PageData::new(
            ctx,
            language,
            &route,
            page_title(Some(title.as_str()), &ctx.blog_name),
            RepositoryView::build(catalog, &filter, language),
        );
        write_page(ctx, &route_file(&language.route(&route)), "repository", &data)
            .with_context(|| format!("while generating tag {:?}", tag.name))?;
    }
    Ok(())
}

fn generate_language(ctx: &Context, catalog: &Catalog, language: Language) -> anyhow::Result<()> {
    info!("Generating pages for {}", language.code());

    let home = PageData::new(
        ctx,
        language,
        "/",
        page_title(None, &ctx.blog_name),
        HomeView::build(catalog, language),
    );
    write_page(ctx, &route_file(&language.route("/")), "home", &home)?;

    generate_articles(ctx, catalog, language)?;
    generate_repository(ctx, catalog, language)?;

    let not_found = PageData::new(
        ctx,
        language,
        "/",
        page_title(None, &ctx.blog_name),
        NotFound {
            slug: String::new(),
            article: None,
        },
    );
    write_page(
        ctx,
        &PathBuf::from(language.code()).join("404.html"),
        "not_found",
        &not_found,
    )?;

    feed::write_feed(ctx, catalog, language)?;
    Ok(())
}

pub(crate) fn generate(ctx: &Context) -> anyhow::Result<()> {
    let catalog = Catalog::load(&ctx.data_file)?;
    info!("Loaded {} articles from {:?}", catalog.articles().len(), ctx.data_file);

    fs_extra::dir::remove(&ctx.out_dir)?;
    std::fs::create_dir_all(&ctx.out_dir)?;

    // copy `public_dir`
    let mut cp_opts = CopyOptions::new();
    cp_opts.content_only = true;
    cp_opts.overwrite = true;
    fs_extra::dir::copy(&ctx.public_dir, &ctx.out_dir, &cp_opts)
        .with_context(|| format!("while copying {:?}", ctx.public_dir))?;

    for language in Language::ALL {
        generate_language(ctx, &catalog, language)?;
    }

    // unprefixed urls land on the default language
    std::fs::write(
        ctx.out_dir.join("index.html"),
        redirect_page(&Language::default().route("/")),
    )?;

    info!("Done. Output is in {:?}", ctx.out_dir);
    Ok(())
}
