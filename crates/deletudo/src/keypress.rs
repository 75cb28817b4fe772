//! Key-Press Coordinator: the glue run on every keydown.
//!
//! ```text
//! keydown ─► ContextGuard ─► trigger key? ─► chord? ─► text entry? ─► preventDefault
//!                                                                          │
//!                                     log outcome ◄─ Synthesizer ◄─ Locator ┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::config::DeleteConfig;
use crate::context::{ContextGuard, PageContext};
use crate::dom::Dom;
use crate::interaction::InteractionSynthesizer;
use crate::locator::ElementLocator;
use crate::result::DeletudoResult;
use crate::selector::SelectorStrategy;

/// Modifier keys held during a key-press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control key
    pub ctrl: bool,
    /// Alt / Option key
    pub alt: bool,
    /// Meta / Command key
    pub meta: bool,
}

impl Modifiers {
    /// Whether any chord modifier is held (Shift does not count)
    #[must_use]
    pub const fn any(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// The element a key-press was originally aimed at
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyTarget {
    /// Tag name, any case
    pub tag_name: String,
    /// `isContentEditable`
    pub content_editable: bool,
}

impl KeyTarget {
    /// Create a target
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            content_editable: false,
        }
    }

    /// Mark the target content-editable
    #[must_use]
    pub const fn editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    /// The element a key-press was aimed at, given its composed path.
    ///
    /// Inside shadow DOM `event.target` is retargeted to the outermost host,
    /// so the head of `composedPath()` is preferred; `None` entries stand for
    /// non-element nodes. Falls back to `retargeted` when the path is empty or
    /// does not start at an element.
    #[must_use]
    pub fn from_composed_path(
        path: impl IntoIterator<Item = Option<Self>>,
        retargeted: Option<Self>,
    ) -> Self {
        path.into_iter()
            .next()
            .flatten()
            .or(retargeted)
            .unwrap_or_default()
    }

    /// Whether typing into this target would be hijacked
    #[must_use]
    pub fn is_text_entry(&self) -> bool {
        self.content_editable
            || self.tag_name.eq_ignore_ascii_case("input")
            || self.tag_name.eq_ignore_ascii_case("textarea")
    }
}

/// A key-press as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// `KeyboardEvent.key`
    pub key: String,
    /// Held modifiers
    pub modifiers: Modifiers,
    /// Original event target
    pub target: KeyTarget,
}

impl KeyPress {
    /// A plain key-press aimed at `target`
    #[must_use]
    pub fn new(key: impl Into<String>, target: KeyTarget) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            target,
        }
    }

    /// Set held modifiers
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Why a key-press was let through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// Not the target host or not the inbox view
    OutsideInbox,
    /// Not a trigger key
    NotTriggerKey,
    /// Ctrl, Alt or Meta held
    ModifierChord,
    /// User is typing into a field
    TextEntry,
}

/// Result of handling one key-press
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOutcome {
    /// Left to the page; default not prevented
    Ignored(IgnoreReason),
    /// Intercepted, but no delete control matched
    NotFound,
    /// Activation sequence dispatched
    Activated {
        /// Pattern that located the control
        selector: String,
        /// Shadow nesting it was found at
        shadow_depth: usize,
    },
    /// Intercepted, but activation failed
    Failed {
        /// Error message
        message: String,
    },
}

impl KeyOutcome {
    /// Whether the key-press was intercepted (default prevented)
    #[must_use]
    pub const fn intercepted(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Runs the guard, locator and synthesizer for each key-press
#[derive(Debug, Clone)]
pub struct KeyPressCoordinator {
    guard: ContextGuard,
    trigger_keys: Vec<String>,
    strategies: SelectorStrategy,
    max_shadow_depth: usize,
    synthesizer: InteractionSynthesizer,
}

impl KeyPressCoordinator {
    /// Build from a validated configuration
    pub fn from_config(config: &DeleteConfig) -> DeletudoResult<Self> {
        let strategies = config.validate()?;
        Ok(Self {
            guard: config.guard(),
            trigger_keys: config.trigger_keys.clone(),
            strategies,
            max_shadow_depth: config.max_shadow_depth,
            synthesizer: InteractionSynthesizer::new(),
        })
    }

    /// Decide whether `key` should be intercepted on `page`
    pub fn filter(&self, page: &PageContext, key: &KeyPress) -> Result<(), IgnoreReason> {
        if !self.guard.allows(page) {
            return Err(IgnoreReason::OutsideInbox);
        }
        if !self.trigger_keys.iter().any(|k| *k == key.key) {
            return Err(IgnoreReason::NotTriggerKey);
        }
        if key.modifiers.any() {
            return Err(IgnoreReason::ModifierChord);
        }
        if key.target.is_text_entry() {
            return Err(IgnoreReason::TextEntry);
        }
        Ok(())
    }

    /// Handle one key-press end to end.
    ///
    /// `prevent_default` runs once, before any DOM work, when the press is
    /// intercepted. Nothing here panics or propagates; every outcome is
    /// logged once.
    pub fn handle<D, F>(
        &self,
        dom: &D,
        page: &PageContext,
        key: &KeyPress,
        prevent_default: F,
    ) -> KeyOutcome
    where
        D: Dom,
        F: FnOnce(),
    {
        if let Err(reason) = self.filter(page, key) {
            trace!(key = %key.key, ?reason, "key-press ignored");
            return KeyOutcome::Ignored(reason);
        }

        debug!(key = %key.key, "starting delete action");
        prevent_default();

        let outcome = self.trigger(dom);
        match &outcome {
            KeyOutcome::Activated {
                selector,
                shadow_depth,
            } => info!(%selector, shadow_depth, "delete action triggered"),
            KeyOutcome::NotFound => info!("delete button not found with any selector"),
            KeyOutcome::Failed { message } => error!(%message, "delete action failed"),
            KeyOutcome::Ignored(_) => {}
        }
        outcome
    }

    fn trigger<D: Dom>(&self, dom: &D) -> KeyOutcome {
        let locator = ElementLocator::new(&self.strategies).with_max_depth(self.max_shadow_depth);
        let Some(located) = locator.locate(dom) else {
            return KeyOutcome::NotFound;
        };

        debug!(selector = %located.selector, "found delete button, attempting to click");
        let activation = self.synthesizer.activate(dom, &located.element);
        if activation.success {
            KeyOutcome::Activated {
                selector: located.selector,
                shadow_depth: located.shadow_depth,
            }
        } else {
            KeyOutcome::Failed {
                message: activation
                    .error
                    .unwrap_or_else(|| "activation failed".to_string()),
            }
        }
    }
}
