use anyhow::bail;
use clap::{command, Arg};
use context::Context;
use generator::generate;
use language::Translations;
use log::info;
use renderer::generate_renderer;
use std::path::PathBuf;

mod article;
mod context;
mod generator;
mod language;
mod markdown;
mod renderer;
mod tree;
mod views;

const DEFAULT_BLOG_NAME: &str = "The Peach Speech";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .args([
            Arg::new("data_file")
                .help("JSON index of articles")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("articles.json"),
            Arg::new("article_dir")
                .help("Directory of markdown sources, optionally split by language (en/, es/)")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("articles"),
            Arg::new("out_dir")
                .help("Directory path of output. Existing contents will be removed.")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("out"),
            Arg::new("public_dir")
                .help("Directory path of public. Contents will be copied as it is.")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("public"),
            Arg::new("template_dir")
                .help("Directory of templates and translations (i18n/)")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("template"),
        ])
        .get_matches();

    let path_arg = |name: &str| -> PathBuf {
        matches
            .get_one::<PathBuf>(name)
            .cloned()
            .unwrap_or_default()
    };

    let data_file = path_arg("data_file");
    if !data_file.is_file() {
        bail!("data_file must be a file.");
    }
    let article_dir = path_arg("article_dir");
    if !article_dir.is_dir() {
        bail!("article_dir must be a directory.");
    }
    let out_dir = path_arg("out_dir");
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("if out_dir exists, it must be directory.");
    }
    let public_dir = path_arg("public_dir");
    if !public_dir.is_dir() {
        bail!("public_dir must be a directory.")
    }
    let template_dir = path_arg("template_dir");
    if !template_dir.is_dir() {
        bail!("template_dir must be a directory.")
    }

    let blog_name = std::env::var("BLOG_NAME").unwrap_or(DEFAULT_BLOG_NAME.to_string());
    let blog_url = std::env::var("BLOG_URL").unwrap_or_default();
    info!("Generating {blog_name:?} into {out_dir:?}");

    let ctx = Context {
        data_file,
        article_dir,
        out_dir,
        public_dir,
        blog_name,
        blog_url,
        handlebars: generate_renderer(&template_dir)?,
        translations: Translations::load(&template_dir.join("i18n"))?,
    }
    .init()?;

    generate(ctx)
}
