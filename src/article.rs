use std::{
    borrow::Borrow,
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    path::Path,
};

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One entry of the article index as it is stored on disk.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ArticleDto {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub oneliner: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Article {
    pub title: String,
    pub url: String,
    pub oneliner: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
}

impl TryFrom<ArticleDto> for Article {
    type Error = anyhow::Error;

    fn try_from(dto: ArticleDto) -> anyhow::Result<Self> {
        let date = parse_date(&dto.date).with_context(|| format!("in article {:?}", dto.url))?;
        Ok(Article {
            title: dto.title,
            url: dto.url,
            oneliner: dto.oneliner,
            date,
            tags: dto.tags,
        })
    }
}

impl Article {
    /// Articles are related if they have at least one tag in common.
    pub fn is_related_to(&self, other: &Article) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }
}

pub(crate) fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    bail!("Invalid date format: {value:?}")
}

/// Slugs become a single path segment, so only unreserved characters are
/// accepted and the name cannot start with a dot.
pub(crate) fn is_valid_slug(url: &str) -> bool {
    !url.is_empty()
        && !url.starts_with('.')
        && url
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Route of an article page, relative to the language root.
pub(crate) fn article_path(article: &Article) -> String {
    format!("/article/{}/", article.url)
}

// newest first. same day: by title.
pub(crate) fn sort_article<T: Borrow<Article>>(a: &T, b: &T) -> Ordering {
    let (a, b) = (a.borrow(), b.borrow());
    b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagCount {
    pub name: String,
    pub count: usize,
}

/// The article list, loaded once and shared by every page.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    articles: Vec<Article>,
}

impl Catalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("while reading {path:?}"))?;
        Self::from_json(&content).with_context(|| format!("while loading {path:?}"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let dtos: Vec<ArticleDto> = serde_json::from_str(content)?;
        let articles = dtos
            .into_iter()
            .map(Article::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Self::from_articles(articles)
    }

    pub fn from_articles(mut articles: Vec<Article>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for article in articles.iter() {
            if !is_valid_slug(&article.url) {
                bail!(
                    "Invalid article url {:?}: only letters, digits, '-', '_' and '.' are allowed",
                    article.url
                );
            }
            if !seen.insert(article.url.as_str()) {
                bail!("Duplicate article url: {}", article.url);
            }
        }
        articles.sort_by(sort_article);
        Ok(Catalog { articles })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn find(&self, url: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.url == url)
    }

    pub fn related(&self, article: &Article) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|other| other.url != article.url)
            .filter(|other| other.is_related_to(article))
            .collect()
    }

    pub fn tags(&self) -> Vec<TagCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tag in self.articles.iter().flat_map(|a| a.tags.iter()) {
            *counts.entry(tag).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_string(),
                count,
            })
            .collect()
    }
}
