//! Internationalization (i18n) support
//!
//! UI strings ship inside the binary. Albanian is the site language;
//! English fills in any key a table is missing.

use anyhow::{Context, Result};
use std::collections::HashMap;

/// Language used when a key is missing from the current table
const FALLBACK_LANGUAGE: &str = "en";

/// Embedded language tables
const LANGUAGES: &[(&str, &str)] = &[
    ("sq", include_str!("languages/sq.yml")),
    ("en", include_str!("languages/en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with no tables loaded
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            translations: HashMap::new(),
        }
    }

    /// Create a handler with the embedded tables
    pub fn embedded(language: &str) -> Result<Self> {
        let mut i18n = Self::new(language);
        for (lang, source) in LANGUAGES {
            i18n.add_language(lang, source)
                .with_context(|| format!("Failed to parse embedded language table {:?}", lang))?;
        }

        if !i18n.translations.contains_key(language) {
            tracing::warn!(
                "No translations for language {:?}, falling back to {}",
                language,
                FALLBACK_LANGUAGE
            );
        }

        Ok(i18n)
    }

    /// Parse a YAML table and register it under `lang`
    pub fn add_language(&mut self, lang: &str, source: &str) -> Result<()> {
        let data: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(source)?;
        self.translations.insert(lang.to_string(), data);
        tracing::debug!("Loaded language table: {}", lang);
        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key
    /// Key can be nested like "post.author"
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        if let Some(lang_data) = self.translations.get(lang) {
            if let Some(value) = get_nested_value(lang_data, key) {
                return yaml_value_to_string(value);
            }
        }

        if lang != FALLBACK_LANGUAGE {
            if let Some(lang_data) = self.translations.get(FALLBACK_LANGUAGE) {
                if let Some(value) = get_nested_value(lang_data, key) {
                    return yaml_value_to_string(value);
                }
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// Get a pluralized translation
    pub fn get_plural(&self, key: &str, count: usize) -> String {
        let plural_key = match count {
            0 => format!("{}.zero", key),
            1 => format!("{}.one", key),
            _ => format!("{}.other", key),
        };

        self.get(&plural_key).replace("%d", &count.to_string())
    }

    /// Get all translations for the current language as a flat HashMap
    /// This flattens nested keys using dot notation (e.g., "share.copied")
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(lang_data) = self.translations.get(&self.language) {
            flatten_translations(lang_data, "", &mut result);
        }

        if self.language != FALLBACK_LANGUAGE {
            if let Some(fallback) = self.translations.get(FALLBACK_LANGUAGE) {
                let mut fallback_result = HashMap::new();
                flatten_translations(fallback, "", &mut fallback_result);
                for (k, v) in fallback_result {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }

    /// All translations for the current language as a nested JSON object,
    /// so templates can write `t.post.author`
    pub fn to_value(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        for (key, text) in self.get_all_translations() {
            let parts: Vec<&str> = key.split('.').collect();
            insert_path(&mut root, &parts, text);
        }
        serde_json::Value::Object(root)
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(part);
            }
            _ => return None,
        }
    }

    current
}

fn insert_path(node: &mut serde_json::Map<String, serde_json::Value>, parts: &[&str], text: String) {
    match parts {
        [] => {}
        [leaf] => {
            node.insert(leaf.to_string(), serde_json::Value::String(text));
        }
        [head, rest @ ..] => {
            let child = node
                .entry(head.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if let serde_json::Value::Object(map) = child {
                insert_path(map, rest, text);
            }
        }
    }
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Tagged(_) => {}
            other => {
                result.insert(full_key, yaml_value_to_string(other));
            }
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(FALLBACK_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_albanian() {
        let i18n = I18n::embedded("sq").unwrap();
        assert_eq!(i18n.language(), "sq");
        assert_eq!(i18n.get("listing.all"), "Të Gjitha");
        assert_eq!(i18n.get("post.unknown_author"), "Autor i Panjohur");
        assert_eq!(i18n.get("share.copied"), "U kopjua!");
        assert_eq!(i18n.get("error.not_found"), "Artikulli nuk u gjet");
    }

    #[test]
    fn test_fallback_to_english() {
        let mut i18n = I18n::new("sq");
        i18n.add_language("sq", "listing:\n  all: Të Gjitha\n").unwrap();
        i18n.add_language("en", "listing:\n  all: All\n  read_more: Read more\n")
            .unwrap();

        assert_eq!(i18n.get("listing.all"), "Të Gjitha");
        assert_eq!(i18n.get("listing.read_more"), "Read more");
        assert_eq!(i18n.get("listing.unknown"), "listing.unknown");
    }

    #[test]
    fn test_unknown_language_uses_english() {
        let i18n = I18n::embedded("de").unwrap();
        assert_eq!(i18n.get("nav.home"), "Home");
    }

    #[test]
    fn test_plural() {
        let i18n = I18n::embedded("sq").unwrap();
        assert_eq!(i18n.get_plural("listing.count", 0), "Asnjë artikull");
        assert_eq!(i18n.get_plural("listing.count", 1), "1 artikull në total");
        assert_eq!(i18n.get_plural("listing.count", 12), "12 artikuj në total");
    }

    #[test]
    fn test_get_all_translations() {
        let mut i18n = I18n::new("sq");
        i18n.add_language("sq", "nav:\n  home: Kryefaqja\n").unwrap();
        i18n.add_language("en", "nav:\n  home: Home\n  about: About Us\n")
            .unwrap();

        let all = i18n.get_all_translations();
        assert_eq!(all.get("nav.home"), Some(&"Kryefaqja".to_string()));
        assert_eq!(all.get("nav.about"), Some(&"About Us".to_string()));
    }

    #[test]
    fn test_to_value_nests_keys() {
        let i18n = I18n::embedded("sq").unwrap();
        let value = i18n.to_value();
        assert_eq!(value["post"]["author"], "Autor");
        assert_eq!(value["listing"]["count"]["other"], "%d artikuj në total");
    }

    #[test]
    fn test_embedded_tables_have_same_keys() {
        let mut sq = I18n::new("sq");
        sq.add_language("sq", LANGUAGES[0].1).unwrap();
        let mut en = I18n::new("en");
        en.add_language("en", LANGUAGES[1].1).unwrap();

        let mut sq_keys: Vec<_> = sq.get_all_translations().into_keys().collect();
        let mut en_keys: Vec<_> = en.get_all_translations().into_keys().collect();
        sq_keys.sort();
        en_keys.sort();
        assert_eq!(sq_keys, en_keys);
    }
}
