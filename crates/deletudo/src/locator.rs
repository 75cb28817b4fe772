//! Element Locator: resolve the single delete control currently in the DOM.
//!
//! # Search order
//!
//! 1. Every strategy pattern, in priority order, against the document's light
//!    DOM. First hit wins.
//! 2. Only if that finds nothing: every pattern again, in priority order, with
//!    a depth-first walk through nested shadow roots ([`find_in_shadow_root`]).
//!
//! No scoring happens anywhere: the first element found is the answer.

use tracing::{debug, warn};

use crate::dom::Dom;
use crate::selector::{Selector, SelectorStrategy};

/// Maximum shadow nesting followed before a branch is abandoned
pub const DEFAULT_MAX_SHADOW_DEPTH: usize = 32;

/// A located delete control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<E> {
    /// The element
    pub element: E,
    /// Pattern that matched
    pub selector: String,
    /// Shadow nesting at which it was found; 0 is the light DOM
    pub shadow_depth: usize,
}

/// Finds the delete control using an ordered strategy table
#[derive(Debug, Clone)]
pub struct ElementLocator<'a> {
    strategies: &'a SelectorStrategy,
    max_depth: usize,
}

impl<'a> ElementLocator<'a> {
    /// Create a locator over `strategies`
    #[must_use]
    pub const fn new(strategies: &'a SelectorStrategy) -> Self {
        Self {
            strategies,
            max_depth: DEFAULT_MAX_SHADOW_DEPTH,
        }
    }

    /// Override the shadow depth bound
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Shadow depth bound
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Locate the delete control, or `None` when nothing matches.
    ///
    /// Read-only; a pattern the host rejects is logged and skipped.
    pub fn locate<D: Dom>(&self, dom: &D) -> Option<Located<D::Element>> {
        let document = match dom.document() {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "no document to search");
                return None;
            }
        };

        for selector in self.strategies.iter() {
            match dom.query(&document, selector) {
                Ok(Some(element)) => {
                    debug!(selector = %selector, "delete control found in light DOM");
                    return Some(Located {
                        element,
                        selector: selector.as_str().to_string(),
                        shadow_depth: 0,
                    });
                }
                Ok(None) => {}
                Err(e) => warn!(selector = %selector, error = %e, "selector rejected by host"),
            }
        }

        for selector in self.strategies.iter() {
            if let Some((element, depth)) =
                find_in_shadow_root(dom, &document, selector, 0, self.max_depth)
            {
                debug!(selector = %selector, shadow_depth = depth, "delete control found in shadow DOM");
                return Some(Located {
                    element,
                    selector: selector.as_str().to_string(),
                    shadow_depth: depth,
                });
            }
        }

        debug!(strategies = self.strategies.len(), "no delete control matched");
        None
    }
}

/// Depth-first search for `selector` starting at `root`.
///
/// Tries a direct match within `root` first, then recurses into each shadow
/// root hosted under it, in host document order. Returns the element and the
/// shadow depth it was found at. Branches deeper than `max_depth` are cut off,
/// and each root is searched at most once, so a shadow root reachable from
/// several hosts (or from itself) costs one query.
pub fn find_in_shadow_root<D: Dom>(
    dom: &D,
    root: &D::Root,
    selector: &Selector,
    depth: usize,
    max_depth: usize,
) -> Option<(D::Element, usize)> {
    let mut visited = Vec::new();
    search_root(dom, root, selector, depth, max_depth, &mut visited)
}

fn search_root<D: Dom>(
    dom: &D,
    root: &D::Root,
    selector: &Selector,
    depth: usize,
    max_depth: usize,
    visited: &mut Vec<D::Root>,
) -> Option<(D::Element, usize)> {
    if depth > max_depth {
        warn!(selector = %selector, max_depth, "shadow DOM nesting limit reached");
        return None;
    }
    if visited.contains(root) {
        debug!(selector = %selector, depth, "shadow root already searched");
        return None;
    }
    visited.push(root.clone());

    match dom.query(root, selector) {
        Ok(Some(element)) => return Some((element, depth)),
        Ok(None) => {}
        Err(e) => {
            warn!(selector = %selector, error = %e, "selector rejected by host");
            return None;
        }
    }

    let shadow_roots = match dom.shadow_roots(root) {
        Ok(roots) => roots,
        Err(e) => {
            warn!(error = %e, "failed to enumerate shadow roots");
            return None;
        }
    };

    shadow_roots
        .iter()
        .find_map(|shadow| search_root(dom, shadow, selector, depth + 1, max_depth, visited))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDocument, MockElement};

    fn strategies(patterns: &[&str]) -> SelectorStrategy {
        SelectorStrategy::new(patterns).unwrap()
    }

    mod flat_tests {
        use super::*;

        #[test]
        fn test_no_match_returns_none() {
            let mut doc = MockDocument::new();
            doc.append(doc.root(), MockElement::new("div").attr("aria-label", "Archive"));
            let table = SelectorStrategy::default();
            assert_eq!(ElementLocator::new(&table).locate(&doc), None);
        }

        #[test]
        fn test_empty_document_returns_none() {
            let doc = MockDocument::new();
            let table = SelectorStrategy::default();
            assert!(ElementLocator::new(&table).locate(&doc).is_none());
        }

        #[test]
        fn test_priority_beats_document_order() {
            let mut doc = MockDocument::new();
            let low = doc.append(doc.root(), MockElement::new("div").attr("data-low", ""));
            let high = doc.append(doc.root(), MockElement::new("div").attr("data-high", ""));
            let table = strategies(&["[data-high]", "[data-low]"]);

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, high);
            assert_ne!(found.element, low);
            assert_eq!(found.selector, "[data-high]");
            assert_eq!(found.shadow_depth, 0);
        }

        #[test]
        fn test_stops_after_first_hit() {
            let mut doc = MockDocument::new();
            doc.append(doc.root(), MockElement::new("div").attr("data-a", ""));
            let table = strategies(&["[data-a]", "[data-b]", "[data-c]"]);
            ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(doc.queries(), vec!["[data-a]".to_string()]);
        }

        #[test]
        fn test_flat_pass_precedes_shadow_pass() {
            let mut doc = MockDocument::new();
            let host = doc.append(doc.root(), MockElement::new("x-bar"));
            let shadow = doc.attach_shadow(host);
            doc.append(shadow, MockElement::new("div").attr("data-high", ""));
            let light = doc.append(doc.root(), MockElement::new("div").attr("data-low", ""));
            let table = strategies(&["[data-high]", "[data-low]"]);

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, light);
        }
    }

    mod shadow_tests {
        use super::*;

        #[test]
        fn test_finds_shadow_nested_element() {
            let mut doc = MockDocument::new();
            let host = doc.append(doc.root(), MockElement::new("x-toolbar"));
            let shadow = doc.attach_shadow(host);
            let button = doc.append(
                shadow,
                MockElement::new("div")
                    .attr("role", "button")
                    .attr("aria-label", "Delete"),
            );
            let table = SelectorStrategy::default();

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, button);
            assert_eq!(found.shadow_depth, 1);
        }

        #[test]
        fn test_deeply_nested() {
            let mut doc = MockDocument::new();
            let mut parent = doc.root();
            for _ in 0..5 {
                let host = doc.append(parent, MockElement::new("x-layer"));
                parent = doc.attach_shadow(host);
            }
            let target = doc.append(parent, MockElement::new("div").attr("data-target", ""));
            let table = strategies(&["[data-target]"]);

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, target);
            assert_eq!(found.shadow_depth, 5);
        }

        #[test]
        fn test_host_document_order() {
            let mut doc = MockDocument::new();
            let first_host = doc.append(doc.root(), MockElement::new("x-a"));
            let second_host = doc.append(doc.root(), MockElement::new("x-b"));
            let second_shadow = doc.attach_shadow(second_host);
            let first_shadow = doc.attach_shadow(first_host);
            doc.append(second_shadow, MockElement::new("i").attr("data-target", "2"));
            let first = doc.append(first_shadow, MockElement::new("i").attr("data-target", "1"));
            let table = strategies(&["[data-target]"]);

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, first);
        }

        #[test]
        fn test_depth_limit_cuts_branch() {
            let mut doc = MockDocument::new();
            let mut parent = doc.root();
            for _ in 0..4 {
                let host = doc.append(parent, MockElement::new("x-layer"));
                parent = doc.attach_shadow(host);
            }
            doc.append(parent, MockElement::new("div").attr("data-target", ""));
            let table = strategies(&["[data-target]"]);

            assert!(ElementLocator::new(&table)
                .with_max_depth(3)
                .locate(&doc)
                .is_none());
            assert!(ElementLocator::new(&table)
                .with_max_depth(4)
                .locate(&doc)
                .is_some());
        }

        #[test]
        fn test_cyclic_shadow_terminates() {
            let mut doc = MockDocument::new();
            let host = doc.append(doc.root(), MockElement::new("x-loop"));
            let shadow = doc.attach_shadow(host);
            let inner_host = doc.append(shadow, MockElement::new("x-loop"));
            doc.share_shadow_root(inner_host, shadow);
            let table = strategies(&["[data-target]"]);

            let locator = ElementLocator::new(&table).with_max_depth(8);
            assert!(locator.locate(&doc).is_none());
            // flat query, then the document and the looping root once each
            assert_eq!(doc.queries().len(), 3);
        }

        #[test]
        fn test_shared_cyclic_root_searched_once() {
            let mut doc = MockDocument::new();
            let host = doc.append(doc.root(), MockElement::new("x-loop"));
            let shadow = doc.attach_shadow(host);
            let first = doc.append(shadow, MockElement::new("x-a"));
            let second = doc.append(shadow, MockElement::new("x-b"));
            doc.share_shadow_root(first, shadow);
            doc.share_shadow_root(second, shadow);
            let table = strategies(&["[data-target]"]);

            let locator = ElementLocator::new(&table).with_max_depth(DEFAULT_MAX_SHADOW_DEPTH);
            assert!(locator.locate(&doc).is_none());
            assert_eq!(doc.queries().len(), 3);
        }

        #[test]
        fn test_shared_root_still_finds_target() {
            let mut doc = MockDocument::new();
            let host = doc.append(doc.root(), MockElement::new("x-loop"));
            let shadow = doc.attach_shadow(host);
            let first = doc.append(shadow, MockElement::new("x-a"));
            let second = doc.append(shadow, MockElement::new("x-b"));
            doc.share_shadow_root(first, shadow);
            doc.share_shadow_root(second, shadow);
            let target = doc.append(shadow, MockElement::new("div").attr("data-target", ""));
            let table = strategies(&["[data-target]"]);

            let found = ElementLocator::new(&table).locate(&doc).unwrap();
            assert_eq!(found.element, target);
            assert_eq!(found.shadow_depth, 1);
        }
    }

    #[test]
    fn test_default_max_depth() {
        let table = SelectorStrategy::default();
        assert_eq!(ElementLocator::new(&table).max_depth(), DEFAULT_MAX_SHADOW_DEPTH);
    }
}
