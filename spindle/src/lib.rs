// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{resolve_download_dir, split_content_tags};

// Re-export crawl functionality from spindle-core
pub use spindle_core::crawl::{
    ContentParams, CrawlOptions, CrawlProgressCallback, PageParams, execute_crawl,
    execute_sitemap, extract_url_host, extract_url_path, generate_crawl_report,
    generate_sitemap_outline, tree_to_json,
};
