/// How a single element tag is rewritten. The mapping is closed: anything
/// without a rule falls back to transparent child concatenation, since
/// arbitrary HTML contains tags nobody registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    Heading(u8),
    Paragraph,
    Bold,
    Emphasis,
    LineBreak,
    HorizontalRule,
    UnorderedList,
    OrderedList,
    ListItem,
    Link,
    Image,
    InlineCode,
    CodeBlock,
    Table,
    Blockquote,
    Block,
    Inline,
}

/// Look up the rule for a tag name. `None` means unregistered.
pub fn rule_for(tag: &str) -> Option<TagRule> {
    let rule = match tag {
        "h1" => TagRule::Heading(1),
        "h2" => TagRule::Heading(2),
        "h3" => TagRule::Heading(3),
        "h4" => TagRule::Heading(4),
        "h5" => TagRule::Heading(5),
        "h6" => TagRule::Heading(6),
        "p" => TagRule::Paragraph,
        "b" | "strong" => TagRule::Bold,
        "i" | "em" => TagRule::Emphasis,
        "br" => TagRule::LineBreak,
        "hr" => TagRule::HorizontalRule,
        "ul" => TagRule::UnorderedList,
        "ol" => TagRule::OrderedList,
        "li" => TagRule::ListItem,
        "a" => TagRule::Link,
        "img" => TagRule::Image,
        "code" => TagRule::InlineCode,
        "pre" => TagRule::CodeBlock,
        "table" => TagRule::Table,
        "blockquote" => TagRule::Blockquote,
        "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav" => {
            TagRule::Block
        }
        "span" => TagRule::Inline,
        _ => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_carry_their_level() {
        assert_eq!(rule_for("h1"), Some(TagRule::Heading(1)));
        assert_eq!(rule_for("h6"), Some(TagRule::Heading(6)));
    }

    #[test]
    fn test_aliases_share_a_rule() {
        assert_eq!(rule_for("b"), rule_for("strong"));
        assert_eq!(rule_for("i"), rule_for("em"));
    }

    #[test]
    fn test_unregistered_tags_have_no_rule() {
        assert_eq!(rule_for("marquee"), None);
        assert_eq!(rule_for("custom-widget"), None);
    }
}
