use std::fmt::Write as _;

use log::{debug, warn};
use serde::Serialize;

use crate::{
    article::{article_path, Article, Catalog, TagCount},
    language::Language,
    markdown::{self, Heading},
    tree::{self, ArticleFilter, FlatNode, TreeNode},
};

pub(crate) fn page_title(title: Option<&str>, blog_name: &str) -> String {
    match title {
        Some(title) => format!("{title} | {blog_name}"),
        None => blog_name.to_string(),
    }
}

/// What every list shows about an article.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct ArticleCard<'a> {
    pub title: &'a str,
    pub url: String,
    pub oneliner: &'a str,
    pub date: String,
    pub tags: &'a [String],
}

impl<'a> ArticleCard<'a> {
    pub fn new(article: &'a Article, language: Language) -> Self {
        ArticleCard {
            title: &article.title,
            url: language.route(&article_path(article)),
            oneliner: &article.oneliner,
            date: language.format_date(article.date),
            tags: &article.tags,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct HomeView<'a> {
    pub articles: Vec<ArticleCard<'a>>,
}

impl<'a> HomeView<'a> {
    pub fn build(catalog: &'a Catalog, language: Language) -> Self {
        HomeView {
            articles: catalog
                .articles()
                .iter()
                .map(|a| ArticleCard::new(a, language))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct FoundArticle<'a> {
    pub article: ArticleCard<'a>,
    pub html: String,
    pub headings: Vec<Heading>,
    pub related: Vec<ArticleCard<'a>>,
    pub tree: Vec<TreeNode>,
}

#[derive(Serialize, Debug)]
pub(crate) struct NotFound<'a> {
    pub slug: String,
    pub article: Option<ArticleCard<'a>>,
}

#[derive(Debug)]
pub(crate) enum ArticleView<'a> {
    Found(FoundArticle<'a>),
    NotFound(NotFound<'a>),
}

impl<'a> ArticleView<'a> {
    /// Joins the route slug, the article list and the rendered markdown.
    /// `load` fetches the markdown source of the matched article.
    pub fn resolve<F>(catalog: &'a Catalog, language: Language, slug: &str, load: F) -> Self
    where
        F: FnOnce(&Article) -> anyhow::Result<String>,
    {
        let Some(article) = catalog.find(slug) else {
            debug!("Article not found by URL {slug}");
            return ArticleView::NotFound(NotFound {
                slug: slug.to_string(),
                article: None,
            });
        };

        let source = match load(article) {
            Ok(source) => source,
            Err(e) => {
                warn!("No content for article {slug}: {e:#}");
                return ArticleView::NotFound(NotFound {
                    slug: slug.to_string(),
                    article: Some(ArticleCard::new(article, language)),
                });
            }
        };

        let rendered = markdown::render(&source, &language.route(&article_path(article)));
        ArticleView::Found(FoundArticle {
            article: ArticleCard::new(article, language),
            html: rendered.html,
            headings: rendered.headings,
            related: catalog
                .related(article)
                .into_iter()
                .map(|a| ArticleCard::new(a, language))
                .collect(),
            tree: tree::project(catalog.articles(), language),
        })
    }

    pub fn title(&self, blog_name: &str) -> String {
        match self {
            ArticleView::Found(found) => page_title(Some(found.article.title), blog_name),
            ArticleView::NotFound(_) => page_title(None, blog_name),
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct TagLink {
    pub name: String,
    pub count: usize,
    pub url: String,
    pub active: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct RepositoryView<'a> {
    pub filter: &'a ArticleFilter,
    pub filtered: bool,
    pub total: usize,
    pub nodes: Vec<TreeNode>,
    pub flat: Vec<FlatNode>,
    pub tags: Vec<TagLink>,
}

/// Path segment of a tag page. ASCII letters, digits and `-` pass through,
/// every other byte becomes `_xx`, so the result is a plain directory name
/// that needs no URL encoding and two tags never share one.
pub(crate) fn tag_segment(tag: &str) -> String {
    let mut segment = String::with_capacity(tag.len());
    for byte in tag.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            segment.push(byte as char);
        } else {
            let _ = write!(segment, "_{byte:02x}");
        }
    }
    segment
}

pub(crate) fn tag_path(tag: &str) -> String {
    format!("/repository/tags/{}/", tag_segment(tag))
}

impl<'a> RepositoryView<'a> {
    pub fn build(catalog: &Catalog, filter: &'a ArticleFilter, language: Language) -> Self {
        let nodes = tree::filter(catalog.articles(), filter, language);
        let flat = tree::flatten(&nodes);
        let tags = catalog
            .tags()
            .into_iter()
            .map(|TagCount { name, count }| TagLink {
                url: language.route(&tag_path(&name)),
                active: filter.tags.contains(&name),
                name,
                count,
            })
            .collect();
        RepositoryView {
            filter,
            filtered: !filter.is_empty(),
            total: flat.iter().filter(|n| !n.expandable).count(),
            nodes,
            flat,
            tags,
        }
    }
}
