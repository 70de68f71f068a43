//! Node locator: find the item nodes of a page by trying selector strategies in order.
//!
//! The site restructures its markup between releases, so each record kind carries
//! several strategies from most to least specific. The first one that matches
//! anything wins for that document.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use champscout_shared::{Result, ScoutError};

// ---------------------------------------------------------------------------
// SelectorStrategy
// ---------------------------------------------------------------------------

/// A compiled CSS selector together with its source text.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    source: String,
    selector: Selector,
}

impl SelectorStrategy {
    /// Compile a strategy from CSS selector text.
    pub fn parse(source: &str) -> Result<Self> {
        let selector =
            Selector::parse(source).map_err(|e| ScoutError::selector(source, e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    /// Compile an ordered list of strategies, failing on the first bad selector.
    pub fn parse_all<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Self>> {
        sources.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    /// The selector text this strategy was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl std::fmt::Display for SelectorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// NodeSource
// ---------------------------------------------------------------------------

/// Anything that can answer "which nodes match this strategy", in document order.
///
/// Implemented for a parsed [`Html`] document and for an [`ElementRef`] subtree.
pub trait NodeSource {
    type Node;

    fn select_nodes(&self, strategy: &SelectorStrategy) -> Vec<Self::Node>;
}

impl<'a> NodeSource for &'a Html {
    type Node = ElementRef<'a>;

    fn select_nodes(&self, strategy: &SelectorStrategy) -> Vec<ElementRef<'a>> {
        let doc: &'a Html = *self;
        doc.select(strategy.selector()).collect()
    }
}

impl<'a> NodeSource for ElementRef<'a> {
    type Node = ElementRef<'a>;

    fn select_nodes(&self, strategy: &SelectorStrategy) -> Vec<ElementRef<'a>> {
        let scope: ElementRef<'a> = *self;
        scope.select(strategy.selector()).collect()
    }
}

// ---------------------------------------------------------------------------
// Locating
// ---------------------------------------------------------------------------

/// Nodes found by the first matching strategy.
#[derive(Debug)]
pub struct Located<'s, N> {
    /// The strategy that produced `nodes`.
    pub strategy: &'s SelectorStrategy,
    /// Position of that strategy in the list (0 = most specific).
    pub rank: usize,
    pub nodes: Vec<N>,
}

/// Try `strategies` in order and return the first non-empty result with the
/// strategy that produced it. `None` means no strategy matched.
pub fn locate_with_strategy<'s, S: NodeSource>(
    source: &S,
    strategies: &'s [SelectorStrategy],
) -> Option<Located<'s, S::Node>> {
    for (rank, strategy) in strategies.iter().enumerate() {
        let nodes = source.select_nodes(strategy);
        if nodes.is_empty() {
            trace!(%strategy, "selector strategy found nothing");
            continue;
        }

        debug!(%strategy, rank, count = nodes.len(), "selector strategy matched");
        return Some(Located {
            strategy,
            rank,
            nodes,
        });
    }

    debug!(tried = strategies.len(), "no selector strategy matched");
    None
}

/// Try `strategies` in order and return the nodes of the first one that matches.
///
/// An empty result is a normal outcome ("the page has nothing of this kind").
pub fn locate_item_nodes<S: NodeSource>(source: &S, strategies: &[SelectorStrategy]) -> Vec<S::Node> {
    locate_with_strategy(source, strategies)
        .map(|located| located.nodes)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Tree stand-in answering by selector text.
    struct FakeTree(HashMap<&'static str, Vec<&'static str>>);

    impl NodeSource for FakeTree {
        type Node = &'static str;

        fn select_nodes(&self, strategy: &SelectorStrategy) -> Vec<&'static str> {
            self.0.get(strategy.source()).cloned().unwrap_or_default()
        }
    }

    fn strategies(list: &[&str]) -> Vec<SelectorStrategy> {
        SelectorStrategy::parse_all(list).unwrap()
    }

    #[test]
    fn first_non_empty_strategy_wins() {
        let tree = FakeTree(HashMap::from([
            ("div.legacy", vec!["a", "b"]),
            ("tr", vec!["c"]),
        ]));
        let list = strategies(&["div.current", "div.legacy", "tr"]);

        let located = locate_with_strategy(&tree, &list).unwrap();
        assert_eq!(located.strategy.source(), "div.legacy");
        assert_eq!(located.rank, 1);
        assert_eq!(located.nodes, vec!["a", "b"]);
    }

    #[test]
    fn all_empty_yields_empty_list() {
        let tree = FakeTree(HashMap::new());
        let list = strategies(&["div.current", "tr"]);
        assert!(locate_item_nodes(&tree, &list).is_empty());
        assert!(locate_with_strategy(&tree, &list).is_none());
    }

    #[test]
    fn html_document_in_document_order() {
        let doc = Html::parse_document(
            r#"<ul><li class="x">one</li><li>skip</li><li class="x">two</li></ul>"#,
        );
        let list = strategies(&["li.missing", "li.x"]);
        let nodes = locate_item_nodes(&&doc, &list);
        let texts: Vec<String> = nodes.iter().map(|n| n.text().collect()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn element_subtree_source() {
        let doc = Html::parse_document(
            r#"<div id="a"><p>in</p></div><div id="b"><p>out</p></div>"#,
        );
        let scope_sel = Selector::parse("#a").unwrap();
        let scope = doc.select(&scope_sel).next().unwrap();
        let nodes = locate_item_nodes(&scope, &strategies(&["p"]));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text().collect::<String>(), "in");
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = SelectorStrategy::parse("div[").unwrap_err();
        assert!(matches!(err, ScoutError::Selector { .. }));
        assert!(err.to_string().contains("div["));
    }
}
