//! Insertion-ordered map of page key to page record
//!
//! Serializes as a JSON object whose member order is the crawl's visitation
//! order, and deserializes back in document order.

use crate::report::types::PageRecord;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageMap {
    entries: Vec<(String, PageRecord)>,
    /// Key to position in `entries`
    index: HashMap<String, usize>,
}

impl PageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` under `key`. Returns false, leaving the map
    /// untouched, if the key is already present.
    pub fn insert(&mut self, key: String, record: PageRecord) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, record));
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&PageRecord> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Finds the entry whose record URL equals `url`
    pub fn find_by_url(&self, url: &str) -> Option<(&str, &PageRecord)> {
        self.entries
            .iter()
            .find(|(_, record)| record.url == url)
            .map(|(k, record)| (k.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageRecord)> {
        self.entries.iter().map(|(k, record)| (k.as_str(), record))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &PageRecord> {
        self.entries.iter().map(|(_, record)| record)
    }
}

impl Serialize for PageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

struct PageMapVisitor;

impl<'de> Visitor<'de> for PageMapVisitor {
    type Value = PageMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of page keys to page records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PageMap, A::Error> {
        let mut pages = PageMap::new();
        while let Some((key, record)) = access.next_entry::<String, PageRecord>()? {
            if !pages.insert(key.clone(), record) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate page key '{}'",
                    key
                )));
            }
        }
        Ok(pages)
    }
}

impl<'de> Deserialize<'de> for PageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PageMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> PageRecord {
        PageRecord::empty(url)
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut pages = PageMap::new();
        assert!(pages.insert("a".to_string(), record("https://x.test/")));
        assert!(!pages.insert("a".to_string(), record("https://x.test/other")));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.get("a").unwrap().url, "https://x.test/");
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut pages = PageMap::new();
        pages.insert("zz".to_string(), record("https://x.test/"));
        pages.insert("aa".to_string(), record("https://x.test/b"));

        let json = serde_json::to_string(&pages).unwrap();
        let zz = json.find("\"zz\"").unwrap();
        let aa = json.find("\"aa\"").unwrap();
        assert!(zz < aa);

        let back: PageMap = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.keys().collect();
        assert_eq!(keys, vec!["zz", "aa"]);
    }

    #[test]
    fn test_lookup_many_keys() {
        let mut pages = PageMap::new();
        for i in 0..200 {
            assert!(pages.insert(format!("k{}", i), record(&format!("https://x.test/{}", i))));
        }
        assert!(!pages.insert("k150".to_string(), record("https://x.test/dup")));
        assert_eq!(pages.len(), 200);
        assert_eq!(pages.get("k150").unwrap().url, "https://x.test/150");
        assert_eq!(pages.get("k0").unwrap().url, "https://x.test/0");
        assert!(pages.get("k200").is_none());
        assert!(pages.contains_key("k199"));
    }

    #[test]
    fn test_find_by_url() {
        let mut pages = PageMap::new();
        pages.insert("k1".to_string(), record("https://x.test/a"));
        let (key, _) = pages.find_by_url("https://x.test/a").unwrap();
        assert_eq!(key, "k1");
        assert!(pages.find_by_url("https://x.test/missing").is_none());
    }

    #[test]
    fn test_duplicate_key_in_json_rejected() {
        let json = r#"{"a": {"url": "u", "title": "", "links_found": 0, "images_found": 0,
            "tables_found": 0, "text_content": {"paragraphs": [], "total_word_count": 0},
            "links": [], "images": []},
            "a": {"url": "v", "title": "", "links_found": 0, "images_found": 0,
            "tables_found": 0, "text_content": {"paragraphs": [], "total_word_count": 0},
            "links": [], "images": []}}"#;
        assert!(serde_json::from_str::<PageMap>(json).is_err());
    }
}
