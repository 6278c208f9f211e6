use crate::rules::{TagRule, rule_for};
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;

pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Recursive HTML→Markdown rewriter. Each element is rendered by the rule
/// registered for its tag; unregistered tags pass their children through
/// unchanged. A depth guard stops pathological nesting instead of
/// recursing without bound.
pub struct MarkdownConverter {
    max_depth: usize,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Convert an HTML fragment to Markdown in a single pass.
    pub fn convert(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::new();
        for child in fragment.root_element().children() {
            out.push_str(&self.render_node(child, 1));
        }
        out
    }

    fn render_node(&self, node: NodeRef<'_, Node>, depth: usize) -> String {
        if depth > self.max_depth {
            warn!(
                "markup nested deeper than {} levels, truncating subtree",
                self.max_depth
            );
            return String::new();
        }
        match node.value() {
            Node::Text(text) => normalize_text(&text),
            Node::Element(_) => ElementRef::wrap(node)
                .map(|element| self.render_element(element, depth))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn render_children(&self, element: ElementRef<'_>, depth: usize) -> String {
        element
            .children()
            .map(|child| self.render_node(child, depth + 1))
            .collect()
    }

    fn render_element(&self, element: ElementRef<'_>, depth: usize) -> String {
        match rule_for(element.value().name()) {
            Some(TagRule::Heading(level)) => {
                let inner = self.render_children(element, depth);
                format!("{} {}\n\n", "#".repeat(level as usize), inner.trim())
            }
            Some(TagRule::Paragraph) => {
                let inner = self.render_children(element, depth);
                format!("{}\n\n", inner.trim())
            }
            Some(TagRule::Bold) => {
                let inner = self.render_children(element, depth);
                format!("**{}**", inner.trim())
            }
            Some(TagRule::Emphasis) => {
                let inner = self.render_children(element, depth);
                format!("*{}*", inner.trim())
            }
            Some(TagRule::LineBreak) => "\n".to_string(),
            Some(TagRule::HorizontalRule) => "---\n".to_string(),
            Some(TagRule::UnorderedList) => self.render_list(element, depth, false),
            Some(TagRule::OrderedList) => self.render_list(element, depth, true),
            // Prefixing is the list converters' job; a stray item just
            // renders its content.
            Some(TagRule::ListItem) => self.render_children(element, depth),
            Some(TagRule::Link) => {
                let text = self.render_children(element, depth);
                let text = text.trim();
                match element.value().attr("href") {
                    Some(href) if !href.is_empty() => format!("[{}]({})", text, href),
                    _ => text.to_string(),
                }
            }
            Some(TagRule::Image) => {
                let alt = element.value().attr("alt").unwrap_or("");
                match element.value().attr("src") {
                    Some(src) if !src.is_empty() => format!("![{}]({})", alt, src),
                    _ => String::new(),
                }
            }
            Some(TagRule::InlineCode) => {
                format!("`{}`", element.text().collect::<String>())
            }
            Some(TagRule::CodeBlock) => render_code_block(element),
            Some(TagRule::Table) => self.render_table(element, depth),
            Some(TagRule::Blockquote) => self.render_blockquote(element, depth),
            Some(TagRule::Block) => {
                let inner = self.render_children(element, depth);
                let trimmed = inner.trim();
                if trimmed.is_empty() {
                    String::new()
                } else {
                    format!("{}\n\n", trimmed)
                }
            }
            Some(TagRule::Inline) | None => self.render_children(element, depth),
        }
    }

    fn render_list(&self, element: ElementRef<'_>, depth: usize, ordered: bool) -> String {
        let mut out = String::new();
        let mut counter = 0usize;
        for child in element.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "li" {
                continue;
            }
            counter += 1;
            let item = self.render_children(child, depth + 1);
            if ordered {
                out.push_str(&format!("{}. {}\n", counter, item.trim()));
            } else {
                out.push_str(&format!("* {}\n", item.trim()));
            }
        }
        out.push('\n');
        out
    }

    fn render_table(&self, element: ElementRef<'_>, depth: usize) -> String {
        let tr_selector = Selector::parse("tr").unwrap();
        let table_id = element.id();
        let mut out = String::new();
        let mut first = true;

        for row in element.select(&tr_selector) {
            // rows of nested tables belong to their own table
            let owner = row
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table");
            if owner.is_none_or(|a| a.id() != table_id) {
                continue;
            }

            let names: &[&str] = if first { &["th", "td"] } else { &["td"] };
            let cells: Vec<String> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| names.contains(&cell.value().name()))
                .map(|cell| self.render_cell(cell, depth))
                .collect();
            if cells.is_empty() {
                continue;
            }

            out.push_str(&cells.join(" | "));
            out.push('\n');
            if first {
                out.push_str(&vec!["---"; cells.len()].join(" | "));
                out.push('\n');
                first = false;
            }
        }
        out.push('\n');
        out
    }

    fn render_cell(&self, cell: ElementRef<'_>, depth: usize) -> String {
        let table_selector = Selector::parse("table").unwrap();
        if cell.select(&table_selector).next().is_some() {
            // nested tables are not converted, their text is kept
            let raw = cell.text().collect::<String>();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            self.render_children(cell, depth + 2).trim().to_string()
        }
    }

    fn render_blockquote(&self, element: ElementRef<'_>, depth: usize) -> String {
        let inner = self.render_children(element, depth);
        let mut out = String::new();
        for line in inner.trim().lines() {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_code_block(element: ElementRef<'_>) -> String {
    let language = element
        .value()
        .attr("class")
        .unwrap_or("")
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
        .or_else(|| {
            let selector = Selector::parse("code[data-language]").unwrap();
            element
                .select(&selector)
                .next()
                .and_then(|code| code.value().attr("data-language"))
                .map(str::to_string)
        })
        .unwrap_or_default();

    // fenced content is literal: nested markup is flattened to text so
    // inline rules cannot corrupt the listing
    let code = element.text().collect::<String>();
    format!("```{}\n{}\n```\n\n", language, code.trim_matches('\n'))
}

fn normalize_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let leading = text.starts_with(|c: char| c.is_whitespace());
    let trailing = text.ends_with(|c: char| c.is_whitespace());
    let core = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "{}{}{}",
        if leading { " " } else { "" },
        core,
        if trailing { " " } else { "" }
    )
}
