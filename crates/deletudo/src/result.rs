//! Result and error types for Deletudo.

use thiserror::Error;

/// Result type for Deletudo operations
pub type DeletudoResult<T> = Result<T, DeletudoError>;

/// Errors that can occur while handling a delete shortcut
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeletudoError {
    /// A selector pattern could not be parsed or was rejected by the host
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Offending pattern
        selector: String,
        /// Error message
        message: String,
    },

    /// The strategy table has no patterns
    #[error("Selector strategy list is empty")]
    EmptyStrategies,

    /// No trigger keys configured
    #[error("No trigger keys configured")]
    NoTriggerKeys,

    /// Event construction or dispatch failed
    #[error("Failed to dispatch {event}: {message}")]
    Dispatch {
        /// DOM event type
        event: String,
        /// Error message
        message: String,
    },

    /// Target element is no longer attached to the document
    #[error("Element detached from document: {element}")]
    Detached {
        /// Element description
        element: String,
    },

    /// Window or document unavailable
    #[error("No document available")]
    NoDocument,

    /// Exception thrown by the JavaScript host
    #[error("JavaScript error: {message}")]
    Js {
        /// Error message
        message: String,
    },
}

impl DeletudoError {
    /// Create an invalid selector error
    #[must_use]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a dispatch error
    #[must_use]
    pub fn dispatch(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatch {
            event: event.into(),
            message: message.into(),
        }
    }

    /// Create a detached element error
    #[must_use]
    pub fn detached(element: impl Into<String>) -> Self {
        Self::Detached {
            element: element.into(),
        }
    }

    /// Create a JavaScript error
    #[must_use]
    pub fn js(message: impl Into<String>) -> Self {
        Self::Js {
            message: message.into(),
        }
    }
}
