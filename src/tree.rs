//! Month/year grouping of articles for the repository browser.

use chrono::Datelike;
use serde::Serialize;

use crate::{
    article::{article_path, Article},
    language::Language,
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(article: &Article, language: Language) -> Self {
        TreeNode {
            name: article.title.clone(),
            url: Some(language.route(&article_path(article))),
            children: vec![],
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlatNode {
    pub expandable: bool,
    pub name: String,
    pub level: usize,
    pub url: Option<String>,
}

/// Groups articles by month, keeping the order in which months first appear.
pub(crate) fn project<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    language: Language,
) -> Vec<TreeNode> {
    let mut groups: Vec<((i32, u32), TreeNode)> = vec![];
    for article in articles {
        let key = (article.date.year(), article.date.month());
        let leaf = TreeNode::leaf(article, language);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, node)) => node.children.push(leaf),
            None => groups.push((
                key,
                TreeNode {
                    name: language.format_month(article.date),
                    url: None,
                    children: vec![leaf],
                },
            )),
        }
    }

    groups
        .into_iter()
        .map(|(_, mut node)| {
            node.name = format!("{} ({})", node.name, node.children.len());
            node
        })
        .collect()
}

pub(crate) fn flatten(nodes: &[TreeNode]) -> Vec<FlatNode> {
    fn walk(nodes: &[TreeNode], level: usize, out: &mut Vec<FlatNode>) {
        for node in nodes {
            out.push(FlatNode {
                expandable: !node.children.is_empty(),
                name: node.name.clone(),
                level,
                url: node.url.clone(),
            });
            walk(&node.children, level + 1, out);
        }
    }

    let mut out = vec![];
    walk(nodes, 0, &mut out);
    out
}

/// Tag selection of a repository page. The title text filter runs in the
/// page itself, over the rows written from this selection.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ArticleFilter {
    pub tags: Vec<String>,
}

impl ArticleFilter {
    pub fn tag(tag: &str) -> Self {
        ArticleFilter {
            tags: vec![tag.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.tags.iter().all(|tag| article.tags.contains(tag))
    }
}

pub(crate) fn filter(
    articles: &[Article],
    filter: &ArticleFilter,
    language: Language,
) -> Vec<TreeNode> {
    project(articles.iter().filter(|a| filter.matches(a)), language)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn article(title: &str, url: &str, date: (i32, u32, u32), tags: &[&str]) -> Article {
        Article {
            title: title.to_string(),
            url: url.to_string(),
            oneliner: String::new(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn articles() -> Vec<Article> {
        vec![
            article("Borrow checker", "borrow", (2022, 5, 20), &["rust"]),
            article("Observables", "observables", (2022, 5, 2), &["rxjs", "javascript"]),
            article("Lifetimes", "lifetimes", (2022, 4, 9), &["rust"]),
            // out of order on purpose: must join the May group
            article("Pattern matching", "patterns", (2022, 5, 1), &["rust"]),
        ]
    }

    fn names(nodes: &[TreeNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn groups_by_month_with_counts() {
        let nodes = project(&articles(), Language::En);
        assert_eq!(names(&nodes), vec!["May 2022 (3)", "April 2022 (1)"]);
        assert_eq!(
            names(&nodes[0].children),
            vec!["Borrow checker", "Observables", "Pattern matching"]
        );
        assert_eq!(
            nodes[1].children[0].url.as_deref(),
            Some("/en/article/lifetimes/")
        );
    }

    #[test]
    fn month_labels_follow_language() {
        let nodes = project(&articles(), Language::Es);
        assert_eq!(names(&nodes), vec!["mayo de 2022 (3)", "abril de 2022 (1)"]);
        assert_eq!(
            nodes[0].children[0].url.as_deref(),
            Some("/es/article/borrow/")
        );
    }

    #[test]
    fn flat_projection() {
        let nodes = project(&articles()[2..3], Language::En);
        assert_eq!(
            flatten(&nodes),
            vec![
                FlatNode {
                    expandable: true,
                    name: "April 2022 (1)".to_string(),
                    level: 0,
                    url: None,
                },
                FlatNode {
                    expandable: false,
                    name: "Lifetimes".to_string(),
                    level: 1,
                    url: Some("/en/article/lifetimes/".to_string()),
                },
            ]
        );
    }

    #[test]
    fn tag_filter_drops_empty_months() {
        let filter = ArticleFilter::tag("javascript");
        let nodes = super::filter(&articles(), &filter, Language::En);
        assert_eq!(names(&nodes), vec!["May 2022 (1)"]);
        assert_eq!(names(&nodes[0].children), vec!["Observables"]);
    }

    #[test]
    fn tag_filter_requires_every_tag() {
        let nodes = super::filter(&articles(), &ArticleFilter::tag("rust"), Language::En);
        assert_eq!(names(&nodes), vec!["May 2022 (2)", "April 2022 (1)"]);

        let both = ArticleFilter {
            tags: vec!["rxjs".to_string(), "rust".to_string()],
        };
        assert!(super::filter(&articles(), &both, Language::En).is_empty());
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ArticleFilter::default();
        assert!(filter.is_empty());
        assert!(articles().iter().all(|a| filter.matches(a)));
    }
}
