use std::{collections::HashMap, path::Path};

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ES_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }

    pub fn locale(self) -> &'static str {
        match self {
            Language::En => "en-GB",
            Language::Es => "es-ES",
        }
    }

    /// Flag shown by the language toggle.
    pub fn flag(self) -> &'static str {
        match self {
            Language::En => "/img/uk.png",
            Language::Es => "/img/sp.png",
        }
    }

    /// Prefixes a site route with the language segment.
    pub fn route(self, path: &str) -> String {
        format!("/{}{}", self.code(), path)
    }

    fn month_name(self, date: NaiveDate) -> &'static str {
        let idx = date.month0() as usize;
        match self {
            Language::En => EN_MONTHS[idx],
            Language::Es => ES_MONTHS[idx],
        }
    }

    /// Long date style of the locale.
    pub fn format_date(self, date: NaiveDate) -> String {
        match self {
            Language::En => format!("{} {} {}", date.day(), self.month_name(date), date.year()),
            Language::Es => format!(
                "{} de {} de {}",
                date.day(),
                self.month_name(date),
                date.year()
            ),
        }
    }

    pub fn format_month(self, date: NaiveDate) -> String {
        match self {
            Language::En => format!("{} {}", self.month_name(date), date.year()),
            Language::Es => format!("{} de {}", self.month_name(date), date.year()),
        }
    }
}

/// UI strings per language, read from `<dir>/<code>.json`.
#[derive(Debug, Default)]
pub(crate) struct Translations {
    tables: HashMap<Language, Map<String, Value>>,
}

impl Translations {
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut tables = HashMap::new();
        for language in Language::ALL {
            let path = dir.join(format!("{}.json", language.code()));
            if !path.exists() {
                warn!("Translation file({path:?}) does not exist. ignoring...");
                continue;
            }
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("{path:?}"))?;
            let table: Map<String, Value> =
                serde_json::from_str(&content).with_context(|| format!("{path:?}"))?;
            tables.insert(language, table);
        }
        Ok(Translations { tables })
    }

    #[cfg(test)]
    pub fn from_tables(tables: HashMap<Language, Map<String, Value>>) -> Self {
        Translations { tables }
    }

    pub fn get(&self, language: Language, key: &str) -> String {
        [language, Language::default()]
            .iter()
            .filter_map(|lang| self.tables.get(lang))
            .find_map(|table| table.get(key).and_then(Value::as_str))
            .unwrap_or(key)
            .to_string()
    }

    /// Every string of `language`, with English filling the gaps.
    pub fn table(&self, language: Language) -> Map<String, Value> {
        let mut table = self
            .tables
            .get(&Language::default())
            .cloned()
            .unwrap_or_default();
        if let Some(overrides) = self.tables.get(&language) {
            for (key, value) in overrides {
                table.insert(key.clone(), value.clone());
            }
        }
        table
    }
}
