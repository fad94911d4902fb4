//! Metadata mapping: the first table's key/value rows → [`MetadataMap`].
//!
//! Authors label rows however they like (`Paper Slug`, `paper-slug:`,
//! `PAPER SLUG`), so every label goes through [`normalize_key`] before it
//! is stored. Lookups then go through fallback chains of normalised keys
//! via [`MetadataMap::first_of`].

use crate::pipeline::extract::RawTable;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Normalise a free-form label into a lookup key.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` becomes a single
/// `_`, leading and trailing underscores are stripped, and the result is
/// lower-cased: `"Section-Wise Breakup:"` → `"section_wise_breakup"`.
pub fn normalize_key(key: &str) -> String {
    RE_NON_ALNUM
        .replace_all(key, "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Lenient integer parse: `int(float(x))` semantics.
///
/// Accepts surrounding whitespace and decimal or exponent notation
/// (`"24.0"`, `"1e2"`), truncating toward zero. Empty, non-numeric and
/// non-finite values yield `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Paper-level attributes keyed by normalised label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataMap {
    entries: HashMap<String, String>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under the normalised form of `label`.
    ///
    /// Returns false (and stores nothing) when the label normalises to an
    /// empty key. A later insert of the same key overwrites the earlier one.
    pub fn insert(&mut self, label: &str, value: impl Into<String>) -> bool {
        let key = normalize_key(label);
        if key.is_empty() {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Raw value stored under an already-normalised key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// First non-empty value among `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MetadataMap::new();
        for (k, v) in iter {
            map.insert(k.as_ref(), v);
        }
        map
    }
}

/// Build the metadata map from a key/value table.
///
/// Rows with fewer than two cells, or whose label normalises to nothing,
/// are skipped silently. Cells past the second are ignored.
pub fn parse_metadata(table: &RawTable) -> MetadataMap {
    let mut meta = MetadataMap::new();
    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }
        meta.insert(&row[0], row[1].clone());
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_examples() {
        assert_eq!(normalize_key("Section-Wise Breakup:"), "section_wise_breakup");
        assert_eq!(normalize_key("Paper Slug"), "paper_slug");
        assert_eq!(normalize_key("  Q.No. "), "q_no");
        assert_eq!(normalize_key("Option A"), "option_a");
        assert_eq!(normalize_key("OptionA"), "optiona");
        assert_eq!(normalize_key("---"), "");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_normalize_key_properties() {
        let samples = [
            "Section-Wise Breakup:",
            "__Already_normal__",
            "Ünïcødé Kéy",
            "a--b__c  d",
            "123 Year",
            "!!!",
            "Correct Answer (Key)",
        ];
        for s in samples {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once, "not idempotent for {s:?}");
            assert_eq!(once, once.to_lowercase(), "not lower-case for {s:?}");
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "bad charset for {s:?}: {once}"
            );
            assert!(!once.starts_with('_') && !once.ends_with('_'), "{once}");
        }
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("24"), Some(24));
        assert_eq!(parse_int("24.0"), Some(24));
        assert_eq!(parse_int(" 2024.0 "), Some(2024));
        assert_eq!(parse_int("39.9"), Some(39));
        assert_eq!(parse_int("-3.7"), Some(-3));
        assert_eq!(parse_int("1e2"), Some(100));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("inf"), None);
        assert_eq!(parse_int("NaN"), None);
    }

    #[test]
    fn test_parse_metadata_rows() {
        let table = RawTable::from_rows([
            vec!["Slug", "cat-2024-slot-1"],
            vec!["only one cell"],
            vec!["***", "ignored: empty key"],
            vec!["Year", "2024.0", "extra cell"],
        ]);
        let meta = parse_metadata(&table);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("slug"), Some("cat-2024-slot-1"));
        assert_eq!(meta.get("year"), Some("2024.0"));
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let table = RawTable::from_rows([vec!["Title", "First"], vec!["TITLE:", "Second"]]);
        let meta = parse_metadata(&table);
        assert_eq!(meta.get("title"), Some("Second"));
    }

    #[test]
    fn test_first_of_skips_empty() {
        let meta: MetadataMap = [("slug", ""), ("paper_slug", "cat-2022")].into_iter().collect();
        assert_eq!(meta.first_of(&["slug", "paper_slug"]), Some("cat-2022"));
        assert_eq!(meta.first_of(&["title"]), None);
    }
}
