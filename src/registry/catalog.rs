use serde::Serialize;

use crate::access::AccessLevel;

use super::{CommandKeyword, Keyword, KeywordCategory, KeywordInfo, ParamKeyword};

/// A vocabulary entry as shown by `foldscript-cli keywords`.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub category: KeywordCategory,
    pub access: AccessLevel,
    pub needs_model: bool,
}

fn entry(info: KeywordInfo) -> KeywordEntry {
    KeywordEntry {
        name: info.name,
        description: info.description,
        category: info.category,
        access: info.access,
        needs_model: info.needs_model,
    }
}

/// Every keyword, parameters first, in table order.
pub fn keyword_catalog() -> Vec<KeywordEntry> {
    ParamKeyword::all()
        .iter()
        .map(|p| entry(p.info()))
        .chain(CommandKeyword::all().iter().map(|c| entry(c.info())))
        .collect()
}

/// Catalog entries of one category.
pub fn by_category(category: KeywordCategory) -> Vec<KeywordEntry> {
    keyword_catalog()
        .into_iter()
        .filter(|e| e.category == category)
        .collect()
}

/// Help text for one word, if it is a keyword.
pub fn describe(word: &str) -> Option<String> {
    let info = super::lookup(word).map(Keyword::info)?;
    let mut text = format!("{} ({}): {}", info.name, info.category.slug(), info.description);
    if info.access > AccessLevel::User {
        text.push_str(&format!(" Requires {}.", info.access));
    }
    Some(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_both_tables() {
        let catalog = keyword_catalog();
        assert_eq!(
            catalog.len(),
            ParamKeyword::all().len() + CommandKeyword::all().len()
        );
        assert_eq!(catalog.first().map(|e| e.name), Some("plane"));
    }

    #[test]
    fn exports_are_grouped() {
        let exports = by_category(KeywordCategory::Export);
        assert_eq!(exports.len(), 7);
        assert!(exports.iter().all(|e| e.name.starts_with("export-")));
    }

    #[test]
    fn describe_mentions_access() {
        assert!(describe("load").unwrap().ends_with("Requires ROOT."));
        assert!(describe("paper").unwrap().starts_with("paper (parameter)"));
        assert_eq!(describe("crane"), None);
    }
}
