//! Typed queries over parsed HTML.
//!
//! Extractors never touch `scraper` directly. They ask a [`DocNode`] for the
//! element carrying a [`Marker`] and get `None` back when the page does not
//! have it, so tests can hand them a fake tree instead of real markup.

use crate::error::ParseError;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, warn};

/// A structural marker: an optional tag name plus an optional class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    tag: Option<&'static str>,
    class: Option<String>,
}

impl Marker {
    /// Any element carrying `class`.
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            tag: None,
            class: Some(class.into()),
        }
    }

    /// Any `tag` element.
    pub fn tag(tag: &'static str) -> Self {
        Self {
            tag: Some(tag),
            class: None,
        }
    }

    /// A `tag` element carrying `class`.
    pub fn tagged(tag: &'static str, class: impl Into<String>) -> Self {
        Self {
            tag: Some(tag),
            class: Some(class.into()),
        }
    }

    /// Whether an element with this tag and these classes carries the marker.
    #[cfg(test)]
    pub fn matches<S: AsRef<str>>(&self, tag: &str, classes: &[S]) -> bool {
        let tag_ok = self.tag.is_none_or(|t| t.eq_ignore_ascii_case(tag));
        let class_ok = self
            .class
            .as_deref()
            .is_none_or(|c| classes.iter().any(|have| have.as_ref() == c));
        tag_ok && class_ok
    }

    fn selector(&self) -> Option<Selector> {
        let css = self.to_string();
        match Selector::parse(&css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                debug!(%css, error = %e, "Marker is not a valid selector");
                None
            }
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.tag, &self.class) {
            (Some(tag), Some(class)) => write!(f, "{}.{}", tag, class),
            (Some(tag), None) => f.write_str(tag),
            (None, Some(class)) => write!(f, ".{}", class),
            (None, None) => f.write_str("*"),
        }
    }
}

/// Read-only access to one element of a document tree.
///
/// `find` and `find_all` search descendants only, in document order.
pub trait DocNode: Sized {
    fn find(&self, marker: &Marker) -> Option<Self>;
    fn find_all(&self, marker: &Marker) -> Vec<Self>;
    fn classes(&self) -> Vec<String>;
    fn attr(&self, name: &str) -> Option<String>;
    /// Concatenated text of the element and everything below it.
    fn text(&self) -> String;
}

impl<'a> DocNode for ElementRef<'a> {
    fn find(&self, marker: &Marker) -> Option<Self> {
        let selector = marker.selector()?;
        self.select(&selector).next()
    }

    fn find_all(&self, marker: &Marker) -> Vec<Self> {
        match marker.selector() {
            Some(selector) => self.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Classes in the order the `class` attribute lists them.
    fn classes(&self) -> Vec<String> {
        self.value()
            .attr("class")
            .map(|list| list.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }
}

/// A fetched page and its parsed tree.
pub struct Page {
    url: String,
    html: Html,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url)
            .field("parse_errors", &self.html.errors.len())
            .finish()
    }
}

impl Page {
    /// Parse an HTML body.
    ///
    /// The parser recovers from broken markup on its own; when it had to, a
    /// warning is logged and the recovered tree is used.
    pub fn parse(url: &str, body: &str) -> Result<Self, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::EmptyBody {
                url: url.to_string(),
            });
        }

        let html = Html::parse_document(body);
        if !html.tree.root().children().any(|c| c.value().is_element()) {
            return Err(ParseError::NoRoot {
                url: url.to_string(),
            });
        }
        if !html.errors.is_empty() {
            warn!(
                %url,
                recovered = html.errors.len(),
                "Parser recovered from malformed markup"
            );
        }

        Ok(Self {
            url: url.to_string(),
            html,
        })
    }

    /// The `<html>` element; every query starts here.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

/// In-memory tree for exercising extractors without HTML.
#[cfg(test)]
pub mod fake {
    use super::{DocNode, Marker};

    #[derive(Debug, Clone, Default)]
    pub struct FakeNode {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
        text: String,
        children: Vec<FakeNode>,
    }

    impl FakeNode {
        pub fn new(tag: &str) -> Self {
            Self {
                tag: tag.to_string(),
                ..Default::default()
            }
        }

        pub fn class(mut self, class: &str) -> Self {
            self.classes.push(class.to_string());
            self
        }

        pub fn with_attr(mut self, name: &str, value: &str) -> Self {
            self.attrs.push((name.to_string(), value.to_string()));
            self
        }

        pub fn with_text(mut self, text: &str) -> Self {
            self.text = text.to_string();
            self
        }

        pub fn child(mut self, child: FakeNode) -> Self {
            self.children.push(child);
            self
        }

        fn descendants(&self) -> Vec<&FakeNode> {
            let mut out = Vec::new();
            for child in &self.children {
                out.push(child);
                out.extend(child.descendants());
            }
            out
        }
    }

    impl DocNode for FakeNode {
        fn find(&self, marker: &Marker) -> Option<Self> {
            self.descendants()
                .into_iter()
                .find(|n| marker.matches(&n.tag, &n.classes))
                .cloned()
        }

        fn find_all(&self, marker: &Marker) -> Vec<Self> {
            self.descendants()
                .into_iter()
                .filter(|n| marker.matches(&n.tag, &n.classes))
                .cloned()
                .collect()
        }

        fn classes(&self) -> Vec<String> {
            self.classes.clone()
        }

        fn attr(&self, name: &str) -> Option<String> {
            self.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }

        fn text(&self) -> String {
            let mut out = self.text.clone();
            for child in &self.children {
                out.push_str(&child.text());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = r##"<html><body>
        <div class="MatchInfo-state-text">2-1</div>
        <a class="MatchlistItem MatchlistItem-live" href="/es/match/99">x</a>
        <svg><rect fill="#fc0"></rect></svg>
    </body></html>"##;

    #[test]
    fn test_marker_display() {
        assert_eq!(Marker::class("Event").to_string(), ".Event");
        assert_eq!(Marker::tag("rect").to_string(), "rect");
        assert_eq!(
            Marker::tagged("a", "MatchInfo-home").to_string(),
            "a.MatchInfo-home"
        );
    }

    #[test]
    fn test_marker_matches_any_listed_class() {
        let marker = Marker::tagged("a", "MatchlistItem-live");
        assert!(marker.matches("a", &["MatchlistItem", "MatchlistItem-live"]));
        assert!(!marker.matches("div", &["MatchlistItem-live"]));
        assert!(!marker.matches("a", &["MatchlistItem-before"]));
    }

    #[test]
    fn test_page_queries() {
        let page = Page::parse("https://example.com", SNIPPET).unwrap();
        let root = page.root();

        let score = root.find(&Marker::tagged("div", "MatchInfo-state-text")).unwrap();
        assert_eq!(DocNode::text(&score), "2-1");

        let link = root.find(&Marker::class("MatchlistItem-live")).unwrap();
        assert_eq!(DocNode::attr(&link, "href").as_deref(), Some("/es/match/99"));
        assert_eq!(
            DocNode::classes(&link),
            vec!["MatchlistItem", "MatchlistItem-live"]
        );

        let rect = root.find(&Marker::tag("rect")).unwrap();
        assert_eq!(DocNode::attr(&rect, "fill").as_deref(), Some("#fc0"));

        assert!(root.find(&Marker::class("Event")).is_none());
        assert!(root.find_all(&Marker::class("Event")).is_empty());
    }

    #[test]
    fn test_classes_keep_attribute_order() {
        let page = Page::parse(
            "https://example.com",
            r#"<div class="Event-substitution Event-reverse">x</div>"#,
        )
        .unwrap();
        let node = page.root().find(&Marker::tag("div")).unwrap();
        assert_eq!(
            DocNode::classes(&node),
            vec!["Event-substitution", "Event-reverse"]
        );
    }

    #[test]
    fn test_page_rejects_empty_body() {
        let err = Page::parse("https://example.com", "  \n").unwrap_err();
        assert!(matches!(err, ParseError::EmptyBody { .. }));
    }

    #[test]
    fn test_page_recovers_from_broken_markup() {
        let page = Page::parse("https://example.com", "<div class='x'><p>open").unwrap();
        assert!(page.root().find(&Marker::class("x")).is_some());
    }

    #[test]
    fn test_fake_node_searches_descendants() {
        use fake::FakeNode;

        let tree = FakeNode::new("html").child(
            FakeNode::new("div")
                .class("outer")
                .child(FakeNode::new("span").class("inner").with_text("hi")),
        );
        assert_eq!(tree.find(&Marker::class("inner")).unwrap().text(), "hi");
        assert_eq!(tree.find(&Marker::class("outer")).unwrap().text(), "hi");
        assert!(tree.find(&Marker::class("html")).is_none());
    }
}
