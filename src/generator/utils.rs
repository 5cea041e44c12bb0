use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use log::debug;
use maud::{html, DOCTYPE};
use serde::Serialize;

use crate::{article::Article, context::Context, language::Language};

/// Output file of a route: `/en/article/x/` -> `en/article/x/index.html`.
pub(super) fn route_file(route: &str) -> PathBuf {
    let mut path: PathBuf = route.split('/').filter(|c| !c.is_empty()).collect();
    if route.ends_with('/') || path.as_os_str().is_empty() {
        path.push("index.html");
    }
    path
}

pub(super) fn write_page<T: Serialize>(
    ctx: &Context,
    rel_path: &Path,
    template: &str,
    data: &T,
) -> anyhow::Result<()> {
    let out_path = ctx.out_dir.join(rel_path);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Writing {out_path:?}");
    let fd = File::create(&out_path).with_context(|| format!("{out_path:?}"))?;
    ctx.handlebars
        .render_to_write(template, data, BufWriter::new(fd))
        .with_context(|| format!("while generating {rel_path:?}"))?;
    Ok(())
}

/// Markdown source of `article`: the language specific file first, then the shared one.
pub(super) fn read_source(
    article_dir: &Path,
    language: Language,
    article: &Article,
) -> anyhow::Result<String> {
    let file_name = format!("{}.md", article.url);
    let candidates = [
        article_dir.join(language.code()).join(&file_name),
        article_dir.join(&file_name),
    ];
    for path in candidates.iter() {
        if path.is_file() {
            return std::fs::read_to_string(path).with_context(|| format!("{path:?}"));
        }
    }
    bail!("no source for {:?} in {:?}", article.url, article_dir)
}

pub(super) fn redirect_page(target: &str) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta http-equiv="refresh" content={ "0; url=" (target) };
                link rel="canonical" href=(target);
            }
            body {
                a href=(target) { (target) }
            }
        }
    }
    .into_string()
}
