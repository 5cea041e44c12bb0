use std::{fs::File, io::BufWriter};

use anyhow::{anyhow, Context as _};
use atom_syndication::{Category, Entry, Feed, FixedDateTime, Link, Text};
use chrono::{NaiveDate, NaiveTime};

use crate::{
    article::{article_path, Catalog},
    context::Context,
    language::Language,
};

fn timestamp(date: NaiveDate) -> FixedDateTime {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn link(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

pub(super) fn build_feed(
    blog_name: &str,
    blog_url: &str,
    catalog: &Catalog,
    language: Language,
) -> Feed {
    let base = blog_url.trim_end_matches('/');
    let home = format!("{}{}", base, language.route("/"));

    let entries: Vec<Entry> = catalog
        .articles()
        .iter()
        .map(|article| {
            let url = format!("{}{}", base, language.route(&article_path(article)));
            let mut entry = Entry::default();
            entry.set_title(Text::plain(article.title.clone()));
            entry.set_id(url.clone());
            entry.set_updated(timestamp(article.date));
            entry.set_published(Some(timestamp(article.date)));
            entry.set_summary(Some(Text::plain(article.oneliner.clone())));
            entry.set_links(vec![link(url)]);
            entry.set_categories(
                article
                    .tags
                    .iter()
                    .map(|tag| {
                        let mut category = Category::default();
                        category.set_term(tag.clone());
                        category
                    })
                    .collect::<Vec<_>>(),
            );
            entry
        })
        .collect();

    let updated = catalog
        .articles()
        .first()
        .map(|a| a.date)
        .unwrap_or_default();

    let mut feed = Feed::default();
    feed.set_title(Text::plain(blog_name.to_string()));
    feed.set_id(home.clone());
    feed.set_lang(Some(language.code().to_string()));
    feed.set_updated(timestamp(updated));
    feed.set_links(vec![link(home)]);
    feed.set_entries(entries);
    feed
}

pub(super) fn write_feed(ctx: &Context, catalog: &Catalog, language: Language) -> anyhow::Result<()> {
    let feed = build_feed(&ctx.blog_name, &ctx.blog_url, catalog, language);
    let path = ctx.out_dir.join(language.code()).join("atom.xml");
    let fd = File::create(&path).with_context(|| format!("{path:?}"))?;
    feed.write_to(BufWriter::new(fd))
        .map_err(|e| anyhow!("while writing {path:?}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn entries_follow_catalog_order() {
        let catalog = Catalog::from_json(
            r#"[
                {"title": "Old", "url": "old", "oneliner": "first", "date": "2021-01-01", "tags": ["a"]},
                {"title": "New", "url": "new", "oneliner": "second", "date": "2022-02-02", "tags": []}
            ]"#,
        )
        .unwrap();
        let feed = build_feed("Blog", "https://blog.example/", &catalog, Language::Es);

        assert_eq!(feed.id(), "https://blog.example/es/");
        assert_eq!(feed.updated().date_naive(), NaiveDate::from_ymd_opt(2022, 2, 2).unwrap());
        let ids: Vec<&str> = feed.entries().iter().map(|e| e.id()).collect();
        assert_eq!(
            ids,
            vec![
                "https://blog.example/es/article/new/",
                "https://blog.example/es/article/old/"
            ]
        );
        assert_eq!(feed.entries()[1].categories()[0].term(), "a");
    }
}
