use serde::Serialize;
use serde_json::{Map, Value};

use crate::{context::Context, language::Language};

#[derive(Serialize, Debug)]
pub(super) struct LanguageLink {
    pub code: &'static str,
    pub url: String,
    pub flag: &'static str,
}

/// Data handed to every template: the layout fields plus one view model.
#[derive(Serialize, Debug)]
pub(super) struct PageData<'a, T> {
    pub blog_name: &'a str,
    pub title: String,
    pub lang: &'static str,
    pub locale: &'static str,
    pub path: String,
    pub toggle: LanguageLink,
    pub t: Map<String, Value>,
    pub view: T,
}

impl<'a, T: Serialize> PageData<'a, T> {
    /// `route` is relative to the language root, e.g. `/repository/`.
    pub fn new(ctx: &'a Context, language: Language, route: &str, title: String, view: T) -> Self {
        let other = language.toggle();
        PageData {
            blog_name: &ctx.blog_name,
            title,
            lang: language.code(),
            locale: language.locale(),
            path: language.route(route),
            toggle: LanguageLink {
                code: other.code(),
                url: other.route(route),
                flag: other.flag(),
            },
            t: ctx.translations.table(language),
            view,
        }
    }
}
