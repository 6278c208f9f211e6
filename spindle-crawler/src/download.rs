use crate::error::{CrawlError, Result};
use crate::persist::{sanitize_component, timestamp, unique_filename};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

const MAX_EXTENSION_LEN: usize = 5;

/// Saves linked binary resources (images, documents) to disk. `data:` URLs
/// are decoded inline; everything else goes through the shared HTTP client.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Save one resource into `dir` and return the generated filename.
    pub async fn save_resource(&self, url: &str, dir: &Path) -> Result<String> {
        let (bytes, stem, ext) = if url.starts_with("data:") {
            decode_data_url(url)?
        } else {
            let parsed = Url::parse(url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(CrawlError::InvalidUrl(format!(
                    "unsupported resource scheme: {}",
                    url
                )));
            }
            let (stem, ext) = name_from_url(&parsed);
            let response = self.client.get(parsed).send().await?.error_for_status()?;
            (response.bytes().await?.to_vec(), stem, ext)
        };

        let stem = format!("{}_{}", stem, timestamp());
        let filename = unique_filename(dir, &stem, &ext);
        fs::write(dir.join(&filename), bytes)?;
        debug!("downloaded {} to {}", url, filename);
        Ok(filename)
    }

    /// Download up to `cap` resources (0 = unlimited), in the order given.
    /// Individual failures are logged and skipped. Returns source URL →
    /// saved filename for everything that succeeded.
    pub async fn download_batch<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a String>,
        dir: &Path,
        cap: usize,
    ) -> BTreeMap<String, String> {
        let mut saved = BTreeMap::new();
        for url in urls {
            if cap > 0 && saved.len() >= cap {
                break;
            }
            match self.save_resource(url, dir).await {
                Ok(filename) => {
                    saved.insert(url.clone(), filename);
                }
                Err(e) => {
                    warn!("skipping resource {}: {}", url, e);
                }
            }
        }
        saved
    }
}

/// Split a `data:` URL into payload bytes, a filename stem and an
/// extension. Base64 payloads are decoded; other payloads are written
/// verbatim.
fn decode_data_url(url: &str) -> Result<(Vec<u8>, String, String)> {
    let rest = &url["data:".len()..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CrawlError::FetchError(format!("malformed data URL: {}", url)))?;

    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or("");
    let is_base64 = parts.any(|p| p == "base64");

    let bytes = if is_base64 {
        STANDARD.decode(payload)?
    } else {
        payload.as_bytes().to_vec()
    };

    let ext = media_type
        .rsplit_once('/')
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or(subtype))
        .filter(|e| !e.is_empty())
        .unwrap_or("bin")
        .to_ascii_lowercase();

    Ok((bytes, "inline".to_string(), ext))
}

/// Derive a filename stem and extension from the last path segment.
fn name_from_url(url: &Url) -> (String, String) {
    let segment = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or("");
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN =>
        {
            (sanitize_component(stem), ext.to_ascii_lowercase())
        }
        _ => {
            let stem = sanitize_component(segment);
            let stem = if stem.is_empty() {
                "resource".to_string()
            } else {
                stem
            };
            (stem, "bin".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader() -> Downloader {
        Downloader::new(Client::new())
    }

    #[tokio::test]
    async fn test_save_base64_data_url() {
        let dir = tempfile::tempdir().unwrap();
        // "spindle" in base64
        let url = "data:image/png;base64,c3BpbmRsZQ==";
        let filename = downloader().save_resource(url, dir.path()).await.unwrap();
        assert!(filename.starts_with("inline_"));
        assert!(filename.ends_with(".png"));
        assert_eq!(fs::read(dir.path().join(&filename)).unwrap(), b"spindle");
    }

    #[tokio::test]
    async fn test_save_plain_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let url = "data:text/plain,hello";
        let filename = downloader().save_resource(url, dir.path()).await.unwrap();
        assert!(filename.ends_with(".plain"));
        assert_eq!(fs::read(dir.path().join(&filename)).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = downloader().save_resource("data:nocomma", dir.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = downloader()
            .save_resource("ftp://example.com/a.png", dir.path())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_honors_cap_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            "data:image/png;base64,YQ==".to_string(),
            "data:nocomma".to_string(),
            "data:image/png;base64,Yg==".to_string(),
            "data:image/png;base64,Yw==".to_string(),
        ];
        let saved = downloader().download_batch(&urls, dir.path(), 2).await;
        assert_eq!(saved.len(), 2);
        assert!(saved.contains_key("data:image/png;base64,YQ=="));
        assert!(!saved.contains_key("data:nocomma"));
    }

    #[tokio::test]
    async fn test_batch_unlimited_when_cap_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            "data:image/png;base64,YQ==".to_string(),
            "data:image/png;base64,Yg==".to_string(),
            "data:image/png;base64,Yw==".to_string(),
        ];
        let saved = downloader().download_batch(&urls, dir.path(), 0).await;
        assert_eq!(saved.len(), 3);
    }

    #[test]
    fn test_name_from_url() {
        let url = Url::parse("https://example.com/img/Logo-Big.PNG?v=2").unwrap();
        let (stem, ext) = name_from_url(&url);
        assert_eq!(stem, "Logo-Big");
        assert_eq!(ext, "png");
    }
}
