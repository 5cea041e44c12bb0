use std::path::Path;

use anyhow::Context;
use handlebars::{handlebars_helper, Handlebars};

use crate::views::tag_path;

handlebars_helper!(tag_url: |lang: str, tag: str| format!("/{}{}", lang, tag_path(tag)));
handlebars_helper!(indent: |level: u64| level * 24);

pub(crate) const TEMPLATES: [&str; 4] = ["home", "article", "not_found", "repository"];

pub(crate) fn generate_renderer(template_dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = handlebars::Handlebars::new();
    handlebars.register_helper("tag_url", Box::new(tag_url));
    handlebars.register_helper("indent", Box::new(indent));
    for name in TEMPLATES {
        let file = format!("{name}.hbs");
        handlebars
            .register_template_file(name, template_dir.join(&file))
            .context(file)?;
    }
    handlebars.register_partial(
        "layout",
        std::fs::read_to_string(template_dir.join("layout.hbs")).context("layout.hbs")?,
    )?;

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn helpers() {
        let dir = tempfile::tempdir().unwrap();
        for name in TEMPLATES {
            std::fs::write(dir.path().join(format!("{name}.hbs")), "").unwrap();
        }
        std::fs::write(dir.path().join("layout.hbs"), "").unwrap();
        let mut hbs = generate_renderer(dir.path()).unwrap();
        hbs.register_template_string(
            "t",
            "{{tag_url lang tag}}|{{tag_url lang sharp}}|{{indent 2}}",
        )
        .unwrap();
        let out = hbs
            .render("t", &json!({"lang": "es", "tag": "rust", "sharp": "C#"}))
            .unwrap();
        assert_eq!(out, "/es/repository/tags/rust/|/es/repository/tags/C_23/|48");
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_renderer(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("home.hbs"));
    }
}
