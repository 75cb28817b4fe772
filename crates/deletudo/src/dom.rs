//! DOM capability seam.
//!
//! The locator and synthesizer only need a handful of host capabilities:
//! structural queries against a searchable root, shadow-root enumeration,
//! geometry, event dispatch and native activation. [`Dom`] captures exactly
//! those so the same code drives `web-sys` in the browser and
//! [`MockDocument`](crate::mock::MockDocument) in native tests.

use std::fmt;

use crate::event::{BoundingBox, SyntheticEvent};
use crate::result::DeletudoResult;
use crate::selector::Selector;

/// Host DOM capabilities.
pub trait Dom {
    /// A searchable root: the document or a shadow root. Equality is
    /// identity, so a root reached twice can be recognized.
    type Root: Clone + PartialEq + fmt::Debug;

    /// An element handle; borrowed from the host, never created here
    type Element: Clone + fmt::Debug;

    /// The document root
    fn document(&self) -> DeletudoResult<Self::Root>;

    /// First light-DOM descendant of `root` matching `selector`, in document
    /// order. Does not enter shadow trees.
    fn query(&self, root: &Self::Root, selector: &Selector)
        -> DeletudoResult<Option<Self::Element>>;

    /// Shadow roots attached to descendants of `root`, in document order of
    /// their hosts. Only the immediate shadow trees are returned; nested ones
    /// are reached by searching the returned roots.
    fn shadow_roots(&self, root: &Self::Root) -> DeletudoResult<Vec<Self::Root>>;

    /// Current on-screen bounding box
    fn bounding_box(&self, element: &Self::Element) -> DeletudoResult<BoundingBox>;

    /// First element child, if any
    fn first_element_child(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Dispatch `event` on `element`
    fn dispatch(&self, element: &Self::Element, event: &SyntheticEvent) -> DeletudoResult<bool>;

    /// Invoke the element's native activation (`HTMLElement.click()`).
    ///
    /// Returns `Ok(false)` when the element exposes none.
    fn native_click(&self, element: &Self::Element) -> DeletudoResult<bool>;

    /// Short label for log lines, e.g. `div.T-I#:4`
    fn describe(&self, element: &Self::Element) -> String;
}
