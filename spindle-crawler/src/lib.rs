//! Crawl traversal engine for Spindle.
//!
//! The engine walks a site depth-first from a root URL, classifies every
//! link it finds, optionally captures page content and linked binary
//! resources to disk, and returns a tree of everything visited. A
//! lightweight sitemap mode walks links without capturing anything.

pub mod analyze;
pub mod classify;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod params;
pub mod persist;
pub mod traverse;
pub mod tree;

pub use error::{CrawlError, Result};
pub use fetch::{FetchOptions, PageFetcher, WaitFor};
pub use params::{CrawlMode, CrawlParams, MapParams};
pub use persist::{ContentStore, PageRecord};
pub use traverse::{Crawler, ProgressCallback};
pub use tree::{DUPLICATE_CONTENT, SiteNode};
