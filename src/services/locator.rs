//! Compiled CSS locators and ordered fallback chains.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;
use crate::utils::normalize_lines;

/// A compiled CSS selector that remembers its source text.
#[derive(Debug, Clone)]
pub struct Locator {
    source: String,
    selector: Selector,
}

impl Locator {
    /// Compile a single selector.
    pub fn parse(source: &str) -> Result<Self> {
        let selector =
            Selector::parse(source).map_err(|e| AppError::selector(source, format!("{e:?}")))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    /// Compile a list as one selector group, matching in document order.
    pub fn group(list: &[String]) -> Result<Self> {
        Self::parse(&SelectorConfig::group(list))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// All matches in a whole document.
    pub fn select_in<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }

    /// All matching descendants of `node`, in document order.
    pub fn all<'a, 'b>(&'b self, node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'b
    where
        'a: 'b,
    {
        node.select(&self.selector)
    }

    /// First matching descendant of `node`.
    pub fn first<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        node.select(&self.selector).next()
    }

    /// Text of the first matching descendant, if any element matches.
    pub fn first_text(&self, node: ElementRef<'_>) -> Option<String> {
        self.first(node).map(element_text)
    }

    pub fn matches_any(&self, node: ElementRef<'_>) -> bool {
        self.first(node).is_some()
    }
}

/// Ordered candidate locators for one logical field.
#[derive(Debug, Clone)]
pub struct LocatorChain {
    locators: Vec<Locator>,
}

impl LocatorChain {
    pub fn parse(list: &[String]) -> Result<Self> {
        let locators = list
            .iter()
            .map(|s| Locator::parse(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { locators })
    }

    /// Try each candidate in order; the first one `accept` maps to a value wins.
    ///
    /// Each candidate contributes the text of its first match only.
    pub fn resolve<T>(
        &self,
        node: ElementRef<'_>,
        accept: impl FnMut(String) -> Option<T>,
    ) -> Option<T> {
        self.locators
            .iter()
            .filter_map(|locator| locator.first_text(node))
            .find_map(accept)
    }

    /// First candidate whose text is non-empty.
    pub fn first_non_empty(&self, node: ElementRef<'_>) -> Option<String> {
        self.resolve(node, |text| (!text.is_empty()).then_some(text))
    }
}

/// Elements that start a new line when rendered.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Rendered-ish text of an element.
///
/// `<br>` and block boundaries become line breaks. Each line is then trimmed
/// with its whitespace runs collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    normalize_lines(&raw)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => match el.name() {
                "br" => out.push('\n'),
                "script" | "style" | "template" => {}
                name => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let block = BLOCK_ELEMENTS.contains(&name);
                    if block {
                        out.push('\n');
                    }
                    push_text(child, out);
                    if block {
                        out.push('\n');
                    }
                }
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(list: &[&str]) -> LocatorChain {
        let owned: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        LocatorChain::parse(&owned).unwrap()
    }

    fn first_div(document: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("div").unwrap();
        document.select(&sel).next().unwrap()
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(Locator::parse("div.class").is_ok());
        assert!(Locator::parse(r#"[class*="作者"]"#).is_ok());
        assert!(Locator::parse(r#"[class*="comment"] > div"#).is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(Locator::parse("[[invalid").is_err());
        assert!(LocatorChain::parse(&["p".to_string(), "[[x".to_string()]).is_err());
    }

    #[test]
    fn test_first_text_collapses_horizontal_whitespace() {
        let doc = Html::parse_fragment("<div><p>  hello \t  world </p></div>");
        let locator = Locator::parse("p").unwrap();
        assert_eq!(locator.first_text(first_div(&doc)), Some("hello world".to_string()));
    }

    #[test]
    fn test_element_text_keeps_line_breaks() {
        let doc = Html::parse_fragment("<div>  第一行 \n  第二行  </div>");
        assert_eq!(element_text(first_div(&doc)), "第一行\n第二行");
    }

    #[test]
    fn test_element_text_breaks_on_br_and_blocks() {
        let doc = Html::parse_fragment(
            "<div>a<br>b<p>c</p><span>d</span><span>e</span><script>x()</script></div>",
        );
        assert_eq!(element_text(first_div(&doc)), "a\nb\nc\nde");
    }

    #[test]
    fn test_resolve_skips_to_next_candidate() {
        let doc = Html::parse_fragment(r#"<div><span class="a"> </span><span class="b">ok</span></div>"#);
        let fields = chain(&[".missing", ".a", ".b"]);
        assert_eq!(fields.first_non_empty(first_div(&doc)), Some("ok".to_string()));
    }

    #[test]
    fn test_resolve_uses_first_match_of_each_candidate() {
        // Only the first `.x` is consulted even though a later one has text.
        let doc = Html::parse_fragment(r#"<div><i class="x"></i><i class="x">later</i></div>"#);
        assert_eq!(chain(&[".x"]).first_non_empty(first_div(&doc)), None);
    }

    #[test]
    fn test_group_matches_in_document_order() {
        let doc = Html::parse_fragment(
            r#"<div><b class="sub-comment">one</b><b class="reply">two</b></div>"#,
        );
        let group = Locator::group(&[r#"[class*="reply"]"#.into(), r#"[class*="sub-comment"]"#.into()])
            .unwrap();
        let texts: Vec<String> = group.all(first_div(&doc)).map(element_text).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
