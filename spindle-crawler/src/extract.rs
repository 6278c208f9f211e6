use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use tracing::warn;

/// Extract page text for persistence. With a non-empty `tags` list the
/// output is restricted to matching elements: selectors are applied in the
/// order given, elements in document order, each element's text followed by
/// a single space, and the result is trimmed. An empty list falls back to
/// the whole document's visible text. Selectors that fail to parse are
/// skipped, never fatal.
pub fn extract_content(doc: &Html, tags: &[String]) -> String {
    if tags.is_empty() {
        return visible_text(doc);
    }

    let mut out = String::new();
    for tag in tags {
        let selector = match Selector::parse(tag) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("skipping invalid content selector '{}': {}", tag, e);
                continue;
            }
        };
        for element in doc.select(&selector) {
            for text in element.text() {
                out.push_str(text);
            }
            out.push(' ');
        }
    }
    out.trim().to_string()
}

/// The document's visible text with whitespace runs collapsed to single
/// spaces. Text is taken from the body; script, style and noscript subtrees
/// are excluded.
pub fn visible_text(doc: &Html) -> String {
    let mut raw = String::new();
    collect_text(text_root(doc), &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-separated token count of the document's visible text.
pub fn word_count(doc: &Html) -> usize {
    let mut raw = String::new();
    collect_text(text_root(doc), &mut raw);
    raw.split_whitespace().count()
}

fn text_root(doc: &Html) -> NodeRef<'_, Node> {
    let body = Selector::parse("body").unwrap();
    doc.select(&body)
        .next()
        .map(|element| *element)
        .unwrap_or_else(|| *doc.root_element())
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text),
            Node::Element(element) => {
                if !matches!(element.name(), "script" | "style" | "noscript") {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_tags_in_selector_order() {
        let doc = Html::parse_document(
            "<html><body><p>second</p><h1>first</h1><p>third</p></body></html>",
        );
        let tags = vec!["h1".to_string(), "p".to_string()];
        assert_eq!(extract_content(&doc, &tags), "first second third");
    }

    #[test]
    fn test_extract_trims_trailing_space() {
        let doc = Html::parse_document("<html><body><p>only</p></body></html>");
        assert_eq!(extract_content(&doc, &["p".to_string()]), "only");
    }

    #[test]
    fn test_extract_skips_invalid_selector() {
        let doc = Html::parse_document("<html><body><p>kept</p></body></html>");
        let tags = vec!["<<garbage".to_string(), "p".to_string()];
        assert_eq!(extract_content(&doc, &tags), "kept");
    }

    #[test]
    fn test_whole_document_fallback_normalizes_whitespace() {
        let doc = Html::parse_document(
            "<html><body><h1>Title</h1>\n  <p>one   two</p><script>ignored()</script></body></html>",
        );
        assert_eq!(extract_content(&doc, &[]), "Title one two");
    }

    #[test]
    fn test_word_count_excludes_script_text() {
        let doc = Html::parse_document(
            "<html><body><p>alpha beta</p><script>var x = 1;</script></body></html>",
        );
        assert_eq!(word_count(&doc), 2);
    }
}
