use crate::error::{CrawlError, Result};
use crate::fetch::WaitFor;
use std::time::Duration;

/// What a crawl traversal produces per page: captured content persisted to
/// disk, or bare link nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    Content,
    Link,
}

/// Parameters for [`crate::Crawler::crawl`].
#[derive(Debug, Clone)]
pub struct CrawlParams {
    pub mode: CrawlMode,
    pub max_depth: usize,
    pub restrict_to_path: bool,
    pub dynamic_content: bool,
    pub delay: Duration,
    pub download_images: bool,
    /// 0 = unlimited.
    pub max_images: usize,
    pub download_documents: bool,
    /// 0 = unlimited.
    pub max_documents: usize,
    /// Selectors restricting extracted text; empty = whole-page text.
    pub content_tags: Vec<String>,
    pub get_meta_tags: bool,
    pub raw_html: bool,
    /// Render-wait condition, only meaningful with `dynamic_content`.
    pub wait: Option<WaitFor>,
}

impl CrawlParams {
    pub fn new(mode: CrawlMode) -> Self {
        Self {
            mode,
            max_depth: 2,
            restrict_to_path: false,
            dynamic_content: false,
            delay: Duration::ZERO,
            download_images: false,
            max_images: 0,
            download_documents: false,
            max_documents: 0,
            content_tags: Vec::new(),
            get_meta_tags: false,
            raw_html: false,
            wait: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_restrict_to_path(mut self, restrict: bool) -> Self {
        self.restrict_to_path = restrict;
        self
    }

    pub fn with_dynamic_content(mut self, dynamic: bool) -> Self {
        self.dynamic_content = dynamic;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_image_downloads(mut self, max: usize) -> Self {
        self.download_images = true;
        self.max_images = max;
        self
    }

    pub fn with_document_downloads(mut self, max: usize) -> Self {
        self.download_documents = true;
        self.max_documents = max;
        self
    }

    pub fn with_content_tags(mut self, tags: Vec<String>) -> Self {
        self.content_tags = tags;
        self
    }

    pub fn with_meta_tags(mut self, get_meta_tags: bool) -> Self {
        self.get_meta_tags = get_meta_tags;
        self
    }

    pub fn with_raw_html(mut self, raw_html: bool) -> Self {
        self.raw_html = raw_html;
        self
    }

    pub fn with_wait(mut self, wait: WaitFor) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Caller-misuse checks, run before the first fetch.
    pub fn validate(&self) -> Result<()> {
        if !self.download_images && self.max_images > 0 {
            return Err(CrawlError::InvalidParams(
                "max_images set without download_images".to_string(),
            ));
        }
        if !self.download_documents && self.max_documents > 0 {
            return Err(CrawlError::InvalidParams(
                "max_documents set without download_documents".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for [`crate::Crawler::map`].
#[derive(Debug, Clone)]
pub struct MapParams {
    pub max_depth: usize,
    pub restrict_to_path: bool,
    /// Include external links in the map; ignored when `restrict_to_path`
    /// is set, since the path restriction is absolute.
    pub include_external: bool,
    pub dynamic_content: bool,
    pub delay: Duration,
    pub wait: Option<WaitFor>,
}

impl MapParams {
    pub fn new() -> Self {
        Self {
            max_depth: 2,
            restrict_to_path: false,
            include_external: false,
            dynamic_content: false,
            delay: Duration::ZERO,
            wait: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_restrict_to_path(mut self, restrict: bool) -> Self {
        self.restrict_to_path = restrict;
        self
    }

    pub fn with_include_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    pub fn with_dynamic_content(mut self, dynamic: bool) -> Self {
        self.dynamic_content = dynamic;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_wait(mut self, wait: WaitFor) -> Self {
        self.wait = Some(wait);
        self
    }
}

impl Default for MapParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_cap_without_flag() {
        let mut params = CrawlParams::new(CrawlMode::Content);
        params.max_images = 5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_downloads_with_caps() {
        let params = CrawlParams::new(CrawlMode::Content)
            .with_image_downloads(5)
            .with_document_downloads(0);
        assert!(params.validate().is_ok());
    }
}
