use std::{path::PathBuf, sync::OnceLock};

use crate::language::Translations;

#[derive(Debug)]
pub(crate) struct Context {
    pub data_file: PathBuf,
    pub article_dir: PathBuf,
    pub out_dir: PathBuf,
    pub public_dir: PathBuf,

    pub blog_name: String,
    pub blog_url: String,

    pub handlebars: handlebars::Handlebars<'static>,
    pub translations: Translations,
}

static CONTEXT: OnceLock<Context> = OnceLock::new();

impl Context {
    pub fn init(self) -> anyhow::Result<&'static Context> {
        CONTEXT
            .set(self)
            .map_err(|_| anyhow::anyhow!("context is already initialized"))?;
        Ok(Self::instance())
    }

    pub fn instance() -> &'static Context {
        CONTEXT.get().expect("context is not initialized")
    }
}
