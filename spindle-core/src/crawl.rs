use indicatif::{ProgressBar, ProgressStyle};
use spindle_crawler::{
    ContentStore, CrawlMode, CrawlParams, Crawler, DUPLICATE_CONTENT, MapParams, PageFetcher,
    SiteNode, WaitFor,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Environment variable naming the WebDriver endpoint used for rendered
/// fetches.
pub const WEBDRIVER_ENV: &str = "SPINDLE_WEBDRIVER_URL";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Traversal-shaping parameters shared by crawls and sitemaps.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub max_depth: usize,
    pub restrict_to_path: bool,
    pub dynamic_content: bool,
    pub delay_millis: u64,
    /// Sitemaps only: also map external links.
    pub include_external: bool,
    /// Rendered fetches: CSS selector to wait for before reading the page.
    pub wait_selector: Option<String>,
    /// Rendered fetches: fixed wait before reading the page.
    pub wait_millis: Option<u64>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            max_depth: 2,
            restrict_to_path: false,
            dynamic_content: false,
            delay_millis: 0,
            include_external: false,
            wait_selector: None,
            wait_millis: None,
        }
    }
}

/// Content-capture parameters for crawls.
#[derive(Debug, Clone, Default)]
pub struct ContentParams {
    pub download_images: bool,
    pub max_images: usize,
    pub download_documents: bool,
    pub max_documents: usize,
    pub content_tags: Vec<String>,
    pub get_meta_tags: bool,
    pub raw_html: bool,
}

/// Options for a full content-capturing crawl.
pub struct CrawlOptions {
    pub url: String,
    pub download_dir: PathBuf,
    pub pages: PageParams,
    pub content: ContentParams,
    pub show_progress: bool,
}

/// Callback for reporting operation progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Extract the host component from a URL
pub fn extract_url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Execute a content-capturing crawl with the given options.
/// Returns the visited-page tree; captured pages land in `download_dir`.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<SiteNode, String> {
    let CrawlOptions {
        url,
        download_dir,
        pages,
        content,
        show_progress,
    } = options;

    if let Some(ref callback) = progress_callback {
        callback(format!("Crawling {}", url));
    }

    let store = ContentStore::new(&download_dir).map_err(|e| {
        format!(
            "Failed to create download directory {}: {}",
            download_dir.display(),
            e
        )
    })?;

    let (progress_bar, engine_progress, processed_count) = build_progress(show_progress);

    let mut crawler = Crawler::new()
        .with_store(store)
        .with_progress_callback(engine_progress);
    if pages.dynamic_content {
        crawler = crawler.with_fetcher(PageFetcher::Rendered(connect_webdriver().await?));
    }

    let params = build_crawl_params(&pages, &content);
    let tree = crawler
        .crawl(&url, &params)
        .await
        .map_err(|e| format!("Crawl failed: {}", e))?;

    if let Some(pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} pages processed", total));
    }

    Ok(tree)
}

/// Execute a link-only sitemap traversal. No content is captured.
pub async fn execute_sitemap(
    url: &str,
    pages: PageParams,
    show_progress: bool,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<SiteNode, String> {
    if let Some(ref callback) = progress_callback {
        callback(format!("Mapping {}", url));
    }

    let (progress_bar, engine_progress, processed_count) = build_progress(show_progress);

    let mut crawler = Crawler::new().with_progress_callback(engine_progress);
    if pages.dynamic_content {
        crawler = crawler.with_fetcher(PageFetcher::Rendered(connect_webdriver().await?));
    }

    let mut params = MapParams::new()
        .with_max_depth(pages.max_depth)
        .with_restrict_to_path(pages.restrict_to_path)
        .with_include_external(pages.include_external)
        .with_dynamic_content(pages.dynamic_content)
        .with_delay(Duration::from_millis(pages.delay_millis));
    if let Some(wait) = render_wait(&pages) {
        params = params.with_wait(wait);
    }
    let tree = crawler
        .map(url, &params)
        .await
        .map_err(|e| format!("Sitemap failed: {}", e))?;

    if let Some(pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Sitemap complete! {} pages processed", total));
    }

    Ok(tree)
}

fn build_crawl_params(pages: &PageParams, content: &ContentParams) -> CrawlParams {
    let mut params = CrawlParams::new(CrawlMode::Content)
        .with_max_depth(pages.max_depth)
        .with_restrict_to_path(pages.restrict_to_path)
        .with_dynamic_content(pages.dynamic_content)
        .with_delay(Duration::from_millis(pages.delay_millis))
        .with_content_tags(content.content_tags.clone())
        .with_meta_tags(content.get_meta_tags)
        .with_raw_html(content.raw_html);
    if content.download_images {
        params = params.with_image_downloads(content.max_images);
    }
    if content.download_documents {
        params = params.with_document_downloads(content.max_documents);
    }
    if let Some(wait) = render_wait(pages) {
        params = params.with_wait(wait);
    }
    params
}

const WAIT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(10);

fn render_wait(pages: &PageParams) -> Option<WaitFor> {
    if let Some(selector) = &pages.wait_selector {
        Some(WaitFor::Selector(selector.clone(), WAIT_SELECTOR_TIMEOUT))
    } else {
        pages
            .wait_millis
            .map(|millis| WaitFor::Sleep(Duration::from_millis(millis)))
    }
}

type ProgressParts = (
    Option<Arc<ProgressBar>>,
    spindle_crawler::ProgressCallback,
    Arc<AtomicUsize>,
);

fn build_progress(show_progress: bool) -> ProgressParts {
    let processed_count = Arc::new(AtomicUsize::new(0));

    if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting...");
        let pb = Arc::new(pb);

        let pb_clone = pb.clone();
        let count_clone = processed_count.clone();
        let callback: spindle_crawler::ProgressCallback = Arc::new(move |_depth, _url| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!("Crawling... {} URLs processed", count));
            pb_clone.tick();
        });
        (Some(pb), callback, processed_count)
    } else {
        (None, Arc::new(|_depth, _url| {}), processed_count)
    }
}

async fn connect_webdriver() -> Result<fantoccini::Client, String> {
    let address =
        std::env::var(WEBDRIVER_ENV).unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string());
    fantoccini::ClientBuilder::native()
        .connect(&address)
        .await
        .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", address, e))
}

/// Generate a human-readable report for a finished crawl
pub fn generate_crawl_report(tree: &SiteNode) -> String {
    let mut pages = 0usize;
    let mut captured = 0usize;
    let mut duplicates = 0usize;
    let mut by_host: HashMap<String, Vec<String>> = HashMap::new();

    tree.walk(&mut |node, _| {
        pages += 1;
        match node.content_file.as_deref() {
            Some(DUPLICATE_CONTENT) => duplicates += 1,
            Some(_) => captured += 1,
            None => {}
        }
        by_host
            .entry(extract_url_host(&node.url))
            .or_default()
            .push(extract_url_path(&node.url));
    });

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages visited: {}\n", pages));
    report.push_str(&format!("  Content files written: {}\n", captured));
    report.push_str(&format!("  Duplicate visits: {}\n", duplicates));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for (host, paths) in by_host.iter() {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages found\n\n", paths.len()));
        for path in paths {
            report.push_str(&format!("  {}\n", path));
        }
        report.push('\n');
    }

    report
}

/// Render a sitemap tree as an indented outline
pub fn generate_sitemap_outline(tree: &SiteNode) -> String {
    let mut outline = String::new();
    tree.walk(&mut |node, depth| {
        outline.push_str(&"  ".repeat(depth));
        outline.push_str(&node.url);
        outline.push('\n');
    });
    outline
}

/// Serialize a tree into the wire JSON shape
pub fn tree_to_json(tree: &SiteNode) -> Result<String, String> {
    serde_json::to_string_pretty(tree).map_err(|e| format!("Failed to serialize tree: {}", e))
}

#[cfg(test)]
mod tests {}
