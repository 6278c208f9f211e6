use serde::{Deserialize, Serialize};

/// Sentinel stored in `content_file` when a URL's content was already
/// captured earlier in the same traversal.
pub const DUPLICATE_CONTENT: &str = "duplicate";

/// A node in the output tree. Children are in discovery order and are fully
/// resolved before the node is handed to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteNode {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SiteNode>,
}

impl SiteNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_file: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(url: impl Into<String>, content_file: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_file: Some(content_file.into()),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: SiteNode) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn page_count(&self) -> usize {
        1 + self.children.iter().map(SiteNode::page_count).sum::<usize>()
    }

    /// Depth-first walk over the subtree; `f` receives each node and its
    /// depth relative to this node.
    pub fn walk(&self, f: &mut impl FnMut(&SiteNode, usize)) {
        self.walk_at(0, f);
    }

    fn walk_at(&self, depth: usize, f: &mut impl FnMut(&SiteNode, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_serializes_url_only() {
        let node = SiteNode::new("https://example.com/");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"url":"https://example.com/"}"#);
    }

    #[test]
    fn test_content_node_uses_camel_case() {
        let node = SiteNode::with_content("https://example.com/", "page_20240101.json");
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""contentFile":"page_20240101.json""#));
    }

    #[test]
    fn test_page_count_and_walk() {
        let mut root = SiteNode::new("https://example.com/");
        let mut a = SiteNode::new("https://example.com/a");
        a.add_child(SiteNode::new("https://example.com/a/1"));
        root.add_child(a);
        root.add_child(SiteNode::new("https://example.com/b"));

        assert_eq!(root.page_count(), 4);

        let mut max_depth = 0;
        root.walk(&mut |_, depth| max_depth = max_depth.max(depth));
        assert_eq!(max_depth, 2);
    }
}
