use crate::classify::{self, LinkClassification};
use crate::extract;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Tags counted in `page_stats` when the caller does not supply its own
/// list.
pub const DEFAULT_STAT_TAGS: &[&str] = &["div", "p", "h1", "h2", "h3", "h4", "h5"];

/// Which link subsets [`analyze`] computes. `All` additionally produces
/// element-count stats and the word count; the single-subset variants exist
/// to keep the output (and the work) minimal when only one class matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightScope {
    All,
    Internal,
    External,
    Reference,
    Documents,
    Images,
}

/// A `<meta>` tag captured from a page head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// Summary of a single parsed page: its classified links plus counting
/// statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInsight {
    pub url: String,
    pub title: String,
    pub links: LinkClassification,
    pub page_stats: BTreeMap<String, usize>,
}

/// Analyze a parsed page. `tags` overrides the counted tag list
/// ([`DEFAULT_STAT_TAGS`] otherwise); `scope` selects the link subsets.
pub fn analyze(doc: &Html, url: &Url, tags: Option<&[String]>, scope: InsightScope) -> PageInsight {
    let links = classify::classify_document(doc, url);

    let mut page_stats = BTreeMap::new();
    if scope == InsightScope::All {
        let counted: Vec<String> = match tags {
            Some(tags) => tags.to_vec(),
            None => DEFAULT_STAT_TAGS.iter().map(|t| t.to_string()).collect(),
        };
        for tag in counted {
            if let Ok(selector) = Selector::parse(&tag) {
                page_stats.insert(tag.clone(), doc.select(&selector).count());
            }
        }
        page_stats.insert("internal".to_string(), links.internal.len());
        page_stats.insert("external".to_string(), links.external.len());
        page_stats.insert("reference".to_string(), links.reference.len());
        page_stats.insert("images".to_string(), links.images.len());
        page_stats.insert("wordCount".to_string(), extract::word_count(doc));
    }

    PageInsight {
        url: url.to_string(),
        title: page_title(doc),
        links: scoped(links, scope),
        page_stats,
    }
}

/// The text of the first `<title>` element, or empty.
pub fn page_title(doc: &Html) -> String {
    let selector = Selector::parse("title").unwrap();
    doc.select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Every `<meta>` element carrying a `name` (or `property`) and a `content`
/// attribute.
pub fn meta_tags(doc: &Html) -> Vec<MetaTag> {
    let selector = Selector::parse("meta").unwrap();
    doc.select(&selector)
        .filter_map(|element| {
            let attrs = element.value();
            let name = attrs.attr("name").or_else(|| attrs.attr("property"))?;
            let content = attrs.attr("content")?;
            Some(MetaTag {
                name: name.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

fn scoped(links: LinkClassification, scope: InsightScope) -> LinkClassification {
    let mut kept = LinkClassification::default();
    match scope {
        InsightScope::All => return links,
        InsightScope::Internal => kept.internal = links.internal,
        InsightScope::External => kept.external = links.external,
        InsightScope::Reference => kept.reference = links.reference,
        InsightScope::Documents => kept.documents = links.documents,
        InsightScope::Images => kept.images = links.images,
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
        <head>
            <title> Example Page </title>
            <meta name="description" content="A test page">
            <meta property="og:title" content="Example">
            <meta charset="utf-8">
        </head>
        <body>
            <div><p>one two three</p></div>
            <h1>Heading</h1>
            <a href="/a">a</a>
            <a href="https://other.org/">b</a>
            <img src="/pic.png">
        </body>
    </html>"#;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_analyze_all_includes_stats_and_fixed_keys() {
        let doc = Html::parse_document(PAGE);
        let insight = analyze(&doc, &base(), None, InsightScope::All);

        assert_eq!(insight.title, "Example Page");
        assert_eq!(insight.page_stats["div"], 1);
        assert_eq!(insight.page_stats["p"], 1);
        assert_eq!(insight.page_stats["h1"], 1);
        assert_eq!(insight.page_stats["internal"], 1);
        assert_eq!(insight.page_stats["external"], 1);
        assert_eq!(insight.page_stats["reference"], 0);
        assert_eq!(insight.page_stats["images"], 1);
        // "one two three Heading a b"
        assert_eq!(insight.page_stats["wordCount"], 6);
    }

    #[test]
    fn test_analyze_custom_tag_list() {
        let doc = Html::parse_document(PAGE);
        let tags = vec!["img".to_string()];
        let insight = analyze(&doc, &base(), Some(&tags), InsightScope::All);
        assert_eq!(insight.page_stats["img"], 1);
        assert!(!insight.page_stats.contains_key("div"));
    }

    #[test]
    fn test_analyze_single_scope_drops_other_sets_and_stats() {
        let doc = Html::parse_document(PAGE);
        let insight = analyze(&doc, &base(), None, InsightScope::External);
        assert_eq!(insight.links.external.len(), 1);
        assert!(insight.links.internal.is_empty());
        assert!(insight.links.images.is_empty());
        assert!(insight.page_stats.is_empty());
    }

    #[test]
    fn test_meta_tags_require_name_and_content() {
        let doc = Html::parse_document(PAGE);
        let tags = meta_tags(&doc);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "description");
        assert_eq!(tags[0].content, "A test page");
        assert_eq!(tags[1].name, "og:title");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let doc = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(page_title(&doc), "");
    }
}
