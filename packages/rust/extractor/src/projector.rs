//! Field projector: resolve each field of an item node through its own fallback chain.
//!
//! A chain is an ordered list of [`Step`]s. Each step locates a target element
//! relative to the node and extracts a value from it; the first step producing a
//! non-blank value wins. A miss is `None`, never an error, and a miss on one
//! field has no effect on any other field.

use std::collections::BTreeMap;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

use champscout_shared::Result;

use crate::locator::SelectorStrategy;
use crate::patterns::first_capture;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A projectable field of an item node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Image,
    Wins,
    Losses,
    WinRate,
    Score,
    Level,
    Badge,
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// All descendant text, each piece trimmed, blanks dropped, joined by single spaces.
pub fn flatten_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the element's direct text children only.
pub fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn descendants<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    node.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Elements after `node` in document order, starting with its own descendants
/// and ending with the last element of `container`.
fn following<'a>(
    node: ElementRef<'a>,
    container: Option<ElementRef<'a>>,
) -> impl Iterator<Item = ElementRef<'a>> {
    let target = node.id();
    container.into_iter().flat_map(move |container| {
        container
            .descendants()
            .skip_while(move |n| n.id() != target)
            .skip(1)
            .filter_map(ElementRef::wrap)
    })
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Where a step looks for its target element, relative to the item node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The item node itself.
    Node,
    /// The item node if it matches, else its first matching descendant.
    NodeOrDescendant,
    /// The first matching descendant.
    Descendant,
    /// The first matching element after the node's start tag in document order,
    /// which may lie outside the node but never outside its container: the
    /// nearest ancestor matching [`Locate::within`], or the parent element.
    Following,
}

/// Target lookup for one step.
#[derive(Debug, Clone)]
pub struct Locate {
    scope: Scope,
    selector: Option<Selector>,
    own_text: Option<Regex>,
    container: Option<Selector>,
}

impl Locate {
    /// The item node itself, unconditionally.
    pub fn node() -> Self {
        Self {
            scope: Scope::Node,
            selector: None,
            own_text: None,
            container: None,
        }
    }

    /// Elements in `scope` matching the CSS selector `css`.
    pub fn matching(scope: Scope, css: &str) -> Result<Self> {
        let strategy = SelectorStrategy::parse(css)?;
        Ok(Self {
            scope,
            selector: Some(strategy.selector().clone()),
            own_text: None,
            container: None,
        })
    }

    /// Additionally require the element's own text to match `pattern`.
    pub fn with_own_text(mut self, pattern: Regex) -> Self {
        self.own_text = Some(pattern);
        self
    }

    /// Bound a [`Scope::Following`] search to the nearest ancestor matching `css`.
    /// A node with no such ancestor finds nothing.
    pub fn within(mut self, css: &str) -> Result<Self> {
        self.container = Some(SelectorStrategy::parse(css)?.selector().clone());
        Ok(self)
    }

    fn container_of<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let mut ancestors = node.ancestors().filter_map(ElementRef::wrap);
        match &self.container {
            Some(sel) => ancestors.find(|el| sel.matches(el)),
            None => ancestors.next(),
        }
    }

    fn accepts(&self, el: &ElementRef<'_>) -> bool {
        self.selector.as_ref().is_none_or(|sel| sel.matches(el))
            && self
                .own_text
                .as_ref()
                .is_none_or(|re| re.is_match(&own_text(*el)))
    }

    /// Find the target element for `node`, if any.
    pub fn find<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self.scope {
            Scope::Node => Some(node).filter(|el| self.accepts(el)),
            Scope::NodeOrDescendant => std::iter::once(node)
                .chain(descendants(node))
                .find(|el| self.accepts(el)),
            Scope::Descendant => descendants(node).find(|el| self.accepts(el)),
            Scope::Following => {
                following(node, self.container_of(node)).find(|el| self.accepts(el))
            }
        }
    }
}

/// How a step reads a value from its target element.
#[derive(Debug, Clone)]
pub enum Extract {
    /// An attribute value.
    Attr(String),
    /// The flattened text.
    Text,
    /// Capture group 1 of a pattern over the flattened text.
    Pattern(Regex),
}

impl Extract {
    pub fn attr(name: &str) -> Self {
        Self::Attr(name.to_string())
    }

    fn apply(&self, el: ElementRef<'_>) -> Option<String> {
        match self {
            Self::Attr(name) => el.value().attr(name).and_then(non_blank),
            Self::Text => non_blank(&flatten_text(el)),
            Self::Pattern(re) => first_capture(re, &flatten_text(el)).and_then(non_blank),
        }
    }
}

/// One (locate, extract) attempt.
#[derive(Debug, Clone)]
pub struct Step {
    pub locate: Locate,
    pub extract: Extract,
}

impl Step {
    pub fn new(locate: Locate, extract: Extract) -> Self {
        Self { locate, extract }
    }

    pub fn apply(&self, node: ElementRef<'_>) -> Option<String> {
        self.locate
            .find(node)
            .and_then(|target| self.extract.apply(target))
    }
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// The ordered fallback steps for one field.
#[derive(Debug, Clone)]
pub struct FieldChain {
    pub field: Field,
    pub steps: Vec<Step>,
}

impl FieldChain {
    pub fn new(field: Field, steps: Vec<Step>) -> Self {
        Self { field, steps }
    }

    /// Value from the first step that yields one.
    pub fn resolve(&self, node: ElementRef<'_>) -> Option<String> {
        self.steps.iter().enumerate().find_map(|(i, step)| {
            let value = step.apply(node)?;
            trace!(field = ?self.field, step = i, %value, "field resolved");
            Some(value)
        })
    }
}

/// Resolve a single field of `node`.
pub fn project_field(node: ElementRef<'_>, chain: &FieldChain) -> Option<String> {
    chain.resolve(node)
}

/// Raw field values of one node, plus its flattened text for the row filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedFields {
    pub text: String,
    values: BTreeMap<Field, String>,
}

impl ProjectedFields {
    /// An empty row carrying `text` as its flattened text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

/// Run every chain against `node`.
pub fn project(node: ElementRef<'_>, chains: &[FieldChain]) -> ProjectedFields {
    let mut fields = ProjectedFields::with_text(flatten_text(node));

    for chain in chains {
        if let Some(value) = chain.resolve(node) {
            fields.values.insert(chain.field, value);
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn flatten_text_joins_with_single_spaces() {
        let doc = Html::parse_fragment("<div>  Ahri <b>12승</b>\n\n<i> 8패 </i></div>");
        assert_eq!(flatten_text(first(&doc, "div")), "Ahri 12승 8패");
    }

    #[test]
    fn chain_falls_back_in_order() {
        let doc = Html::parse_fragment(
            r#"<div class="row"><img src="/icons/other.png" alt="Ahri"></div>"#,
        );
        let chain = FieldChain::new(
            Field::Name,
            vec![
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, "img[src*='champion']").unwrap(),
                    Extract::attr("alt"),
                ),
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, "img").unwrap(),
                    Extract::attr("alt"),
                ),
            ],
        );
        assert_eq!(project_field(first(&doc, "div.row"), &chain), Some("Ahri".into()));
    }

    #[test]
    fn blank_attribute_is_a_miss() {
        let doc = Html::parse_fragment(r#"<div><img src="/champion/x.png" alt="  "></div>"#);
        let chain = FieldChain::new(
            Field::Name,
            vec![Step::new(
                Locate::matching(Scope::Descendant, "img").unwrap(),
                Extract::attr("alt"),
            )],
        );
        assert_eq!(chain.resolve(first(&doc, "div")), None);
    }

    #[test]
    fn node_or_descendant_accepts_the_node() {
        let doc = Html::parse_fragment(r#"<li><div><img src="/champion/zed.png" alt="Zed"></div></li>"#);
        let img = first(&doc, "img");
        let locate = Locate::matching(Scope::NodeOrDescendant, "img").unwrap();
        assert_eq!(locate.find(img).map(|el| el.value().name()), Some("img"));
        let only_below = Locate::matching(Scope::Descendant, "img").unwrap();
        assert!(only_below.find(img).is_none());
    }

    #[test]
    fn following_scope_leaves_the_node() {
        let doc = Html::parse_fragment(
            r#"<ul>
                <li><div class="card"><img alt="Zed"></div><span>Level</span><span>12,345</span></li>
                <li><span>99,999</span></li>
            </ul>"#,
        );
        let card = first(&doc, "div.card");
        let locate = Locate::matching(Scope::Following, "span")
            .unwrap()
            .with_own_text(Regex::new(r"\d").unwrap())
            .within("li")
            .unwrap();
        let found = locate.find(card).unwrap();
        assert_eq!(own_text(found), "12,345");
    }

    #[test]
    fn following_scope_stops_at_its_container() {
        let doc = Html::parse_fragment(
            r#"<ul>
                <li><div class="card"><img alt="Zed"></div></li>
                <li><div class="card"><img alt="Ahri"></div><span>99,999</span></li>
            </ul>"#,
        );
        let zed = first(&doc, "div.card");
        let in_item = Locate::matching(Scope::Following, "span")
            .unwrap()
            .within("li")
            .unwrap();
        assert!(in_item.find(zed).is_none());

        let no_container = Locate::matching(Scope::Following, "span")
            .unwrap()
            .within("section")
            .unwrap();
        assert!(no_container.find(zed).is_none());
    }

    #[test]
    fn pattern_extract_over_node_text() {
        let doc = Html::parse_fragment("<table><tr><td>Ahri</td><td>12승 8패</td></tr></table>");
        let step = Step::new(Locate::node(), Extract::Pattern(Regex::new(r"(\d+)\s*패").unwrap()));
        assert_eq!(step.apply(first(&doc, "tr")), Some("8".into()));
    }

    #[test]
    fn project_collects_independent_fields() {
        let doc = Html::parse_fragment(r#"<table><tr><td>7승</td></tr></table>"#);
        let chains = vec![
            FieldChain::new(
                Field::Name,
                vec![Step::new(
                    Locate::matching(Scope::Descendant, "img").unwrap(),
                    Extract::attr("alt"),
                )],
            ),
            FieldChain::new(
                Field::Wins,
                vec![Step::new(Locate::node(), Extract::Pattern(Regex::new(r"(\d+)\s*승").unwrap()))],
            ),
        ];
        let fields = project(first(&doc, "tr"), &chains);
        assert_eq!(fields.get(Field::Name), None);
        assert_eq!(fields.get(Field::Wins), Some("7"));
        assert_eq!(fields.text, "7승");
    }
}
