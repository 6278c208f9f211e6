use crate::analyze::{self, InsightScope, MetaTag};
use crate::classify;
use crate::download::Downloader;
use crate::error::{CrawlError, Result};
use crate::extract;
use crate::fetch::{DEFAULT_USER_AGENT, FetchOptions, PageFetcher, default_client};
use crate::params::{CrawlMode, CrawlParams, MapParams};
use crate::persist::{ContentStore, PageRecord};
use crate::tree::{DUPLICATE_CONTENT, SiteNode};
use futures::future::BoxFuture;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// The traversal engine. One instance can run many traversals; each call
/// owns its visitation state, so independent traversals are isolated.
pub struct Crawler {
    fetcher: PageFetcher,
    downloader: Downloader,
    store: Option<ContentStore>,
    referrer: Option<String>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_USER_AGENT, Duration::from_secs(10))
    }

    pub fn with_config(user_agent: &str, timeout: Duration) -> Self {
        let client = default_client(user_agent, timeout);
        Self {
            fetcher: PageFetcher::Static(client.clone()),
            downloader: Downloader::new(client),
            store: None,
            referrer: None,
            progress_callback: None,
        }
    }

    /// Swap in a different fetcher, typically a rendered one for
    /// JavaScript-heavy sites. The binary downloader keeps its HTTP client.
    pub fn with_fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Destination for captured page records; required for content crawls.
    pub fn with_store(mut self, store: ContentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Referrer sent with the root fetch. Child fetches always send their
    /// parent page.
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Depth-first content crawl rooted at `root_url`. Per-page failures
    /// prune that page's subtree and never abort the traversal; only
    /// pre-flight parameter problems (and a dead root) are fatal.
    pub async fn crawl(&self, root_url: &str, params: &CrawlParams) -> Result<SiteNode> {
        let root = parse_root(root_url)?;
        params.validate()?;
        if params.mode == CrawlMode::Content && self.store.is_none() {
            return Err(CrawlError::InvalidParams(
                "content capture requires a content store".to_string(),
            ));
        }
        self.check_fetcher(params.dynamic_content)?;

        info!("starting crawl of {} (max depth {})", root, params.max_depth);
        let mut traversal = Traversal {
            crawler: self,
            root: root.to_string(),
            state: VisitState::default(),
        };
        let tree = traversal
            .visit_crawl(params, root.to_string(), 0, self.referrer.clone())
            .await
            .ok_or_else(|| {
                CrawlError::FetchError(format!("root page produced no result: {}", root_url))
            })?;
        info!("crawl complete, {} pages in tree", tree.page_count());
        Ok(tree)
    }

    /// Link-only sitemap rooted at `root_url`. No content is ever
    /// persisted. Pages at `max_depth` still have their links read, and
    /// those children appear as unfetched leaf nodes one level beyond.
    pub async fn map(&self, root_url: &str, params: &MapParams) -> Result<SiteNode> {
        let root = parse_root(root_url)?;
        self.check_fetcher(params.dynamic_content)?;

        info!("starting sitemap of {} (max depth {})", root, params.max_depth);
        let mut traversal = Traversal {
            crawler: self,
            root: root.to_string(),
            state: VisitState::default(),
        };
        let tree = traversal
            .visit_map(params, root.to_string(), 0, self.referrer.clone())
            .await
            .ok_or_else(|| {
                CrawlError::FetchError(format!("root page produced no result: {}", root_url))
            })?;
        info!("sitemap complete, {} nodes in tree", tree.page_count());
        Ok(tree)
    }

    fn check_fetcher(&self, dynamic_content: bool) -> Result<()> {
        if dynamic_content != self.fetcher.is_rendered() {
            return Err(CrawlError::InvalidParams(
                "dynamic_content does not match the configured fetcher".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Visitation bookkeeping for one traversal. A URL may appear in
/// `visited_by_depth` under several depths (it is a link node each time),
/// while `visited_global` caps content capture at once per URL per
/// traversal.
#[derive(Default)]
struct VisitState {
    visited_global: HashSet<String>,
    visited_by_depth: HashMap<usize, HashSet<String>>,
}

impl VisitState {
    fn seen_at_depth(&self, depth: usize, url: &str) -> bool {
        self.visited_by_depth
            .get(&depth)
            .is_some_and(|seen| seen.contains(url))
    }

    fn mark_depth(&mut self, depth: usize, url: &str) {
        self.visited_by_depth
            .entry(depth)
            .or_default()
            .insert(url.to_string());
    }
}

struct Traversal<'a> {
    crawler: &'a Crawler,
    root: String,
    state: VisitState,
}

impl Traversal<'_> {
    fn visit_crawl<'b>(
        &'b mut self,
        params: &'b CrawlParams,
        url: String,
        depth: usize,
        referrer: Option<String>,
    ) -> BoxFuture<'b, Option<SiteNode>> {
        Box::pin(async move {
            if depth > params.max_depth {
                return None;
            }
            if params.restrict_to_path && !url.starts_with(&self.root) {
                return None;
            }
            if self.state.seen_at_depth(depth, &url) {
                return None;
            }
            if !params.delay.is_zero() {
                tokio::time::sleep(params.delay).await;
            }
            self.state.mark_depth(depth, &url);
            if let Some(callback) = &self.crawler.progress_callback {
                callback(depth, url.clone());
            }

            let (mut node, children) = match self
                .capture_page(params, &url, referrer.as_deref())
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!("skipping {}: {}", url, e);
                    return None;
                }
            };

            for child in children {
                if let Some(child_node) = self
                    .visit_crawl(params, child, depth + 1, Some(url.clone()))
                    .await
                {
                    node.add_child(child_node);
                }
            }
            Some(node)
        })
    }

    /// Fetch and process a single page: parse, classify, and in content
    /// mode capture it (first visit) or emit the duplicate sentinel.
    /// Returns the page's node plus its internal links for recursion.
    async fn capture_page(
        &mut self,
        params: &CrawlParams,
        url: &str,
        referrer: Option<&str>,
    ) -> Result<(SiteNode, Vec<String>)> {
        let parsed_url = Url::parse(url)?;
        let options = FetchOptions {
            referrer: referrer.map(str::to_string),
            wait: params.wait.clone(),
        };
        let body = self.crawler.fetcher.fetch(&parsed_url, &options).await?;

        let capture =
            params.mode == CrawlMode::Content && !self.state.visited_global.contains(url);
        let page = parse_page(&body, &parsed_url, params, capture);

        let node = if capture {
            self.state.visited_global.insert(url.to_string());
            let store = self
                .crawler
                .store
                .as_ref()
                .expect("store presence checked before traversal");

            let mut record =
                PageRecord::new(url, &page.title, page.content.unwrap_or_default());
            if params.get_meta_tags {
                record.meta_tags = Some(page.meta);
            }
            if params.download_images {
                record.image_files = Some(
                    self.crawler
                        .downloader
                        .download_batch(&page.images, store.dir(), params.max_images)
                        .await,
                );
            }
            if params.download_documents {
                record.document_files = Some(
                    self.crawler
                        .downloader
                        .download_batch(&page.documents, store.dir(), params.max_documents)
                        .await,
                );
            }

            match store.save(&record) {
                Ok(filename) => SiteNode::with_content(url, filename),
                Err(e) => {
                    warn!("failed to persist {}: {}", url, e);
                    SiteNode::new(url)
                }
            }
        } else if params.mode == CrawlMode::Link {
            SiteNode::new(url)
        } else {
            SiteNode::with_content(url, DUPLICATE_CONTENT)
        };

        Ok((node, page.internal))
    }

    fn visit_map<'b>(
        &'b mut self,
        params: &'b MapParams,
        url: String,
        depth: usize,
        referrer: Option<String>,
    ) -> BoxFuture<'b, Option<SiteNode>> {
        Box::pin(async move {
            if depth > params.max_depth {
                return None;
            }
            if params.restrict_to_path && !url.starts_with(&self.root) {
                return None;
            }
            if self.state.seen_at_depth(depth, &url) {
                return None;
            }
            if !params.delay.is_zero() {
                tokio::time::sleep(params.delay).await;
            }
            self.state.mark_depth(depth, &url);
            if let Some(callback) = &self.crawler.progress_callback {
                callback(depth, url.clone());
            }

            let links = match self.fetch_links(params, &url, referrer.as_deref()).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("skipping {}: {}", url, e);
                    return None;
                }
            };

            let mut node = SiteNode::new(url.clone());
            for child in links {
                if depth == params.max_depth {
                    // Frontier: the map keeps one extra level of discovered
                    // links as unfetched leaves.
                    if params.restrict_to_path && !child.starts_with(&self.root) {
                        continue;
                    }
                    if self.state.seen_at_depth(depth + 1, &child) {
                        continue;
                    }
                    self.state.mark_depth(depth + 1, &child);
                    node.add_child(SiteNode::new(child));
                } else if let Some(child_node) = self
                    .visit_map(params, child, depth + 1, Some(url.clone()))
                    .await
                {
                    node.add_child(child_node);
                }
            }
            Some(node)
        })
    }

    async fn fetch_links(
        &self,
        params: &MapParams,
        url: &str,
        referrer: Option<&str>,
    ) -> Result<Vec<String>> {
        let parsed_url = Url::parse(url)?;
        let options = FetchOptions {
            referrer: referrer.map(str::to_string),
            wait: params.wait.clone(),
        };
        let body = self.crawler.fetcher.fetch(&parsed_url, &options).await?;

        let doc = Html::parse_document(&body);
        let links = classify::classify_document(&doc, &parsed_url);
        let mut result: Vec<String> = links.internal.into_iter().collect();
        if params.include_external && !params.restrict_to_path {
            result.extend(links.external);
        }
        Ok(result)
    }
}

struct ParsedPage {
    title: String,
    meta: Vec<MetaTag>,
    internal: Vec<String>,
    images: Vec<String>,
    documents: Vec<String>,
    content: Option<String>,
}

/// Everything the traversal needs from a page body, extracted in one pass
/// so the parsed DOM never crosses an await point.
fn parse_page(body: &str, url: &Url, params: &CrawlParams, capture: bool) -> ParsedPage {
    let doc = Html::parse_document(body);
    let scope = if capture {
        InsightScope::All
    } else {
        InsightScope::Internal
    };
    let insight = analyze::analyze(&doc, url, None, scope);

    let content = if capture {
        Some(if params.raw_html {
            body.to_string()
        } else {
            extract::extract_content(&doc, &params.content_tags)
        })
    } else {
        None
    };
    let meta = if capture && params.get_meta_tags {
        analyze::meta_tags(&doc)
    } else {
        Vec::new()
    };

    ParsedPage {
        title: insight.title,
        meta,
        internal: insight.links.internal.into_iter().collect(),
        images: insight.links.images.into_iter().collect(),
        documents: insight.links.documents.into_iter().collect(),
        content,
    }
}

fn parse_root(root_url: &str) -> Result<Url> {
    let url = Url::parse(root_url)
        .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", root_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::InvalidUrl(format!(
            "unsupported scheme: {}",
            root_url
        )));
    }
    Ok(url)
}
