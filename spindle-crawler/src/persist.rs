use crate::analyze::MetaTag;
use crate::error::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_STEM_LEN: usize = 120;

/// The per-page artifact written by a content-capturing crawl. One JSON file
/// per captured page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_tags: Option<Vec<MetaTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_files: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_files: Option<BTreeMap<String, String>>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: String) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content,
            meta_tags: None,
            image_files: None,
            document_files: None,
        }
    }
}

/// Directory-backed sink for captured page records. Filenames are derived
/// from the page title plus a millisecond timestamp; a counter suffix keeps
/// them unique when two saves land in the same millisecond.
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `record` as a JSON file and return the generated filename.
    pub fn save(&self, record: &PageRecord) -> Result<String> {
        let mut stem = sanitize_component(&record.title);
        if stem.is_empty() {
            stem = "page".to_string();
        }
        let filename = unique_filename(&self.dir, &format!("{}_{}", stem, timestamp()), "json");
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.dir.join(&filename), json)?;
        debug!("saved {} to {}", record.url, filename);
        Ok(filename)
    }
}

/// Replace filesystem-hostile characters (`\/:*?"<>|`) and spaces with
/// underscores and bound the length.
pub fn sanitize_component(s: &str) -> String {
    s.chars()
        .take(MAX_STEM_LEN)
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

/// Millisecond-resolution local timestamp used in generated filenames.
pub(crate) fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S%3f").to_string()
}

/// First free `stem.ext` name in `dir`, appending `_1`, `_2`, ... on
/// collision.
pub(crate) fn unique_filename(dir: &Path, stem: &str, ext: &str) -> String {
    let candidate = format!("{}.{}", stem, ext);
    if !dir.join(&candidate).exists() {
        return candidate;
    }
    let mut counter = 1usize;
    loop {
        let candidate = format!("{}_{}.{}", stem, counter, ext);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_hostile_characters() {
        assert_eq!(
            sanitize_component(r#"A/B\C:D*E?F"G<H>I|J K"#),
            "A_B_C_D_E_F_G_H_I_J_K"
        );
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_component(&long).len(), MAX_STEM_LEN);
    }

    #[test]
    fn test_save_writes_json_with_title_stem() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        let record = PageRecord::new("https://example.com/", "My Page", "hello".to_string());

        let filename = store.save(&record).unwrap();
        assert!(filename.starts_with("My_Page_"));
        assert!(filename.ends_with(".json"));

        let body = fs::read_to_string(dir.path().join(&filename)).unwrap();
        let parsed: PageRecord = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_save_serializes_camel_case_and_omits_empty_sections() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        let mut record = PageRecord::new("https://example.com/", "t", "c".to_string());
        record.meta_tags = Some(vec![MetaTag {
            name: "description".to_string(),
            content: "d".to_string(),
        }]);

        let filename = store.save(&record).unwrap();
        let body = fs::read_to_string(dir.path().join(&filename)).unwrap();
        assert!(body.contains("\"metaTags\""));
        assert!(!body.contains("\"imageFiles\""));
        assert!(!body.contains("\"documentFiles\""));
    }

    #[test]
    fn test_repeated_saves_get_distinct_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        let record = PageRecord::new("https://example.com/", "Same Title", "c".to_string());

        let a = store.save(&record).unwrap();
        let b = store.save(&record).unwrap();
        let c = store.save(&record).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(dir.path().join(&a).exists());
        assert!(dir.path().join(&b).exists());
        assert!(dir.path().join(&c).exists());
    }

    #[test]
    fn test_empty_title_falls_back_to_page() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        let record = PageRecord::new("https://example.com/", "", "c".to_string());
        let filename = store.save(&record).unwrap();
        assert!(filename.starts_with("page_"));
    }
}
