//! Deletudo: delete the open Gmail conversation with a single key
//!
//! A content-script engine compiled to WASM. On every keydown in the inbox
//! view it finds the page's delete control, searching through nested shadow
//! DOM, and drives it with a synthetic pointer/focus/click sequence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     DELETUDO Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ keydown    │    │ Context    │    │ Element    │             │
//! │   │ (browser)  │───►│ Guard      │───►│ Locator    │             │
//! │   └────────────┘    └────────────┘    └─────┬──────┘             │
//! │                                             │ light DOM, then    │
//! │                                             │ shadow roots       │
//! │                                             ▼                    │
//! │                     ┌────────────┐    ┌────────────┐             │
//! │                     │ Dom trait  │◄───│Interaction │             │
//! │                     │ web / mock │    │Synthesizer │             │
//! │                     └────────────┘    └────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything except [`browser`] is host-agnostic and runs natively against
//! [`mock::MockDocument`]; enable the `wasm` feature for the `web-sys` entry
//! point.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod context;
mod dom;
mod event;
mod interaction;
mod keypress;
mod locator;
mod logging;
mod result;
mod selector;

/// In-memory DOM for native tests and demos
pub mod mock;

/// `web-sys` bindings and the `#[wasm_bindgen(start)]` entry point
#[cfg(feature = "wasm")]
pub mod browser;

pub use config::{DeleteConfig, DEFAULT_LOG_LEVEL, DEFAULT_TRIGGER_KEYS};
pub use context::{ContextGuard, PageContext, DEFAULT_HOST, DEFAULT_INBOX_MARKER};
pub use dom::Dom;
pub use event::{BoundingBox, Point, SyntheticEvent, SyntheticEventKind, SyntheticEventSequence};
pub use interaction::{Activation, InteractionSynthesizer};
pub use keypress::{
    IgnoreReason, KeyOutcome, KeyPress, KeyPressCoordinator, KeyTarget, Modifiers,
};
pub use locator::{find_in_shadow_root, ElementLocator, Located, DEFAULT_MAX_SHADOW_DEPTH};
pub use logging::init_logging;
#[cfg(feature = "wasm")]
pub use logging::{ConsoleMakeWriter, ConsoleWriter};
pub use result::{DeletudoError, DeletudoResult};
pub use selector::{
    AttrOperator, AttrPredicate, AttributeSource, Compound, Selector, SelectorStrategy,
    DEFAULT_DELETE_SELECTORS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        ContextGuard, DeleteConfig, DeletudoError, DeletudoResult, Dom, ElementLocator,
        IgnoreReason, InteractionSynthesizer, KeyOutcome, KeyPress, KeyPressCoordinator,
        KeyTarget, Modifiers, PageContext, SelectorStrategy,
    };
}
