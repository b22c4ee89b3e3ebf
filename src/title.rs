//! Normalization rules for language codes and page/category titles.

use regex::Regex;
use std::sync::LazyLock;

static RE_NAMESPACE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[^:]+:"#).expect("Regexp error"));

/// Lowercases and trims a language code. No validation is done here;
/// an unknown code only shows up as a failed existence check.
pub fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase()
}

/// Trims a page title and replaces underscores with spaces.
pub fn normalize_title(title: &str) -> String {
    title.trim().replace('_', " ")
}

/// Strips the namespace prefix from a category title as returned by the wiki API,
/// e.g. "Category:Canines" becomes "Canines".
/// Only the first segment is removed, so "Category:Star Wars: Episode I" keeps its inner colon.
/// Localized prefixes ("Catégorie:") are handled the same way.
pub fn strip_namespace(title: &str) -> String {
    RE_NAMESPACE_PREFIX.replace(title, "").trim().to_string()
}

/// The title under which Wikidata stores a category sitelink.
pub fn category_page_title(category: &str) -> String {
    format!("Category:{category}")
}
