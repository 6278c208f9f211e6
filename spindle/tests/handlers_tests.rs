use spindle::handlers::*;
use spindle_crawler::SiteNode;

#[test]
fn test_split_content_tags_basic() {
    assert_eq!(
        split_content_tags("h1,p,article"),
        vec!["h1".to_string(), "p".to_string(), "article".to_string()]
    );
}

#[test]
fn test_split_content_tags_trims_and_drops_empties() {
    assert_eq!(
        split_content_tags(" h1 , , p ,"),
        vec!["h1".to_string(), "p".to_string()]
    );
}

#[test]
fn test_resolve_download_dir_plain_path() {
    let dir = resolve_download_dir("./pages");
    assert_eq!(dir, std::path::PathBuf::from("./pages"));
}

#[test]
fn test_resolve_download_dir_expands_tilde() {
    let dir = resolve_download_dir("~/pages");
    assert!(!dir.to_string_lossy().starts_with('~'));
}

#[test]
fn test_extract_url_path_reexport() {
    assert_eq!(extract_url_path("https://example.com/api/users"), "/api/users");
    assert_eq!(extract_url_path("https://example.com/"), "/");
    assert_eq!(extract_url_path("https://example.com"), "/");
}

#[test]
fn test_generate_crawl_report_from_tree() {
    let mut root = SiteNode::with_content("https://example.com/", "Root_1.json");
    root.add_child(SiteNode::with_content("https://example.com/a", "A_1.json"));
    root.add_child(SiteNode::new("https://example.com/b"));

    let report = generate_crawl_report(&root);
    assert!(report.contains("Pages visited: 3"));
    assert!(report.contains("Content files written: 2"));
    assert!(report.contains("## example.com"));
    assert!(report.contains("/a"));
    assert!(report.contains("/b"));
}

#[test]
fn test_generate_sitemap_outline_shape() {
    let mut root = SiteNode::new("https://example.com/");
    root.add_child(SiteNode::new("https://example.com/a"));

    let outline = generate_sitemap_outline(&root);
    assert_eq!(outline, "https://example.com/\n  https://example.com/a\n");
}
