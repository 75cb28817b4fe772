//! Interaction Synthesizer: replay a user-like click on a located element.
//!
//! For the target, and then for its first element child when there is one:
//! dispatch `mousedown`, `focusin`, `mouseup`, `click` at the center of the
//! element's bounding box, then call the native `click()`. Both mechanisms and
//! both targets are always attempted; different UI revisions respond to
//! different ones.

use tracing::{debug, error};

use crate::dom::Dom;
use crate::event::SyntheticEventSequence;
use crate::result::DeletudoResult;

/// Outcome of one activation attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    /// An activation sequence was dispatched against the control. Not a
    /// confirmation that anything was deleted.
    pub success: bool,
    /// Synthetic events dispatched across parent and child
    pub events_dispatched: usize,
    /// Native `click()` calls that went through
    pub native_clicks: usize,
    /// Whether the first child was also activated
    pub child_attempted: bool,
    /// Error that aborted the attempt
    pub error: Option<String>,
}

impl Activation {
    fn failed(partial: Self, message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            ..partial
        }
    }
}

/// Dispatches synthetic activation sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionSynthesizer;

impl InteractionSynthesizer {
    /// Create a synthesizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Activate `target`, then its first element child.
    ///
    /// Errors are caught here, logged, and reported through
    /// [`Activation::error`]; they never propagate.
    pub fn activate<D: Dom>(&self, dom: &D, target: &D::Element) -> Activation {
        let mut report = Activation::default();

        debug!(target = %dom.describe(target), "simulating click on delete control");
        if let Err(e) = self.simulate_click(dom, target, &mut report) {
            error!(target = %dom.describe(target), error = %e, "error during delete action");
            return Activation::failed(report, e.to_string());
        }

        if let Some(child) = dom.first_element_child(target) {
            debug!(child = %dom.describe(&child), "also clicking first child element");
            report.child_attempted = true;
            if let Err(e) = self.simulate_click(dom, &child, &mut report) {
                error!(child = %dom.describe(&child), error = %e, "error during delete action");
                return Activation::failed(report, e.to_string());
            }
        }

        report.success = true;
        report
    }

    fn simulate_click<D: Dom>(
        &self,
        dom: &D,
        element: &D::Element,
        report: &mut Activation,
    ) -> DeletudoResult<()> {
        let bounds = dom.bounding_box(element)?;
        let sequence = SyntheticEventSequence::at_center_of(&bounds);

        for event in sequence.iter() {
            dom.dispatch(element, event)?;
            report.events_dispatched += 1;
        }

        if dom.native_click(element)? {
            report.native_clicks += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::event::{BoundingBox, Point};
    use crate::mock::{Interaction, MockDocument, MockElement};

    #[test]
    fn test_four_events_then_native_click() {
        let mut doc = MockDocument::new();
        let button = doc.append(doc.root(), MockElement::new("div"));

        let report = InteractionSynthesizer::new().activate(&doc, &button);
        assert!(report.success);
        assert_eq!(report.events_dispatched, 4);
        assert_eq!(report.native_clicks, 1);
        assert!(!report.child_attempted);
        assert_eq!(
            doc.activity_on(button),
            vec!["mousedown", "focusin", "mouseup", "click", "click()"]
        );
    }

    #[test]
    fn test_repeats_on_first_child() {
        let mut doc = MockDocument::new();
        let button = doc.append(doc.root(), MockElement::new("div"));
        let icon = doc.append(button, MockElement::new("div").attr("class", "asa"));
        let second = doc.append(button, MockElement::new("div"));

        let report = InteractionSynthesizer::new().activate(&doc, &button);
        assert!(report.success);
        assert!(report.child_attempted);
        assert_eq!(report.events_dispatched, 8);
        assert_eq!(report.native_clicks, 2);

        let expected = vec!["mousedown", "focusin", "mouseup", "click", "click()"];
        assert_eq!(doc.activity_on(button), expected);
        assert_eq!(doc.activity_on(icon), expected);
        assert!(doc.activity_on(second).is_empty());

        // parent sequence completes before the child's starts
        let targets: Vec<_> = doc.interactions().iter().map(Interaction::target).collect();
        assert_eq!(targets[..5], [button; 5]);
        assert_eq!(targets[5..], [icon; 5]);
    }

    #[test]
    fn test_pointer_events_at_center() {
        let mut doc = MockDocument::new();
        let button = doc.append(
            doc.root(),
            MockElement::new("div").bounds(BoundingBox::new(200.0, 10.0, 40.0, 20.0)),
        );

        InteractionSynthesizer::new().activate(&doc, &button);
        for interaction in doc.interactions() {
            if let Interaction::Event { event, .. } = interaction {
                if event.kind.is_pointer() {
                    assert_eq!(event.client, Some(Point::new(220.0, 20.0)));
                }
            }
        }
    }

    #[test]
    fn test_no_native_click_still_succeeds() {
        let mut doc = MockDocument::new();
        let button = doc.append(doc.root(), MockElement::new("svg").without_native_click());

        let report = InteractionSynthesizer::new().activate(&doc, &button);
        assert!(report.success);
        assert_eq!(report.native_clicks, 0);
        assert_eq!(report.events_dispatched, 4);
    }

    #[test]
    fn test_detached_target_reports_failure() {
        let mut doc = MockDocument::new();
        let button = doc.append(doc.root(), MockElement::new("div"));
        doc.append(button, MockElement::new("span"));
        doc.detach(button);

        let report = InteractionSynthesizer::new().activate(&doc, &button);
        assert!(!report.success);
        assert!(report.error.unwrap().contains("detached"));
        assert!(!report.child_attempted);
        assert!(doc.interactions().is_empty());
    }
}
