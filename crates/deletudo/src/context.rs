//! Context Guard: should a key-press be intercepted on this page?

use serde::{Deserialize, Serialize};
use url::Url;

/// Webmail host the shortcut targets
pub const DEFAULT_HOST: &str = "mail.google.com";

/// Fragment token identifying the inbox view
pub const DEFAULT_INBOX_MARKER: &str = "#inbox";

/// Page address as seen at key-press time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageContext {
    /// `location.hostname`
    pub host: String,
    /// `location.hash`, including the leading `#`; empty when absent
    pub fragment: String,
}

impl PageContext {
    /// Create from hostname and hash
    #[must_use]
    pub fn new(host: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            fragment: fragment.into(),
        }
    }

    /// Derive host and fragment from a full URL.
    ///
    /// Returns `None` when `href` is not an absolute URL.
    #[must_use]
    pub fn from_href(href: &str) -> Option<Self> {
        let url = Url::parse(href).ok()?;
        let fragment = match url.fragment() {
            None => String::new(),
            Some(f) => format!("#{f}"),
        };
        Some(Self {
            host: url.host_str().unwrap_or_default().to_string(),
            fragment,
        })
    }
}

/// Decides from the page address alone whether the shortcut applies.
///
/// Pure string comparisons; cheap enough to run on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextGuard {
    host: String,
    inbox_marker: String,
}

impl Default for ContextGuard {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_INBOX_MARKER)
    }
}

impl ContextGuard {
    /// Create a guard for `host` with the given inbox fragment token
    #[must_use]
    pub fn new(host: impl Into<String>, inbox_marker: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            inbox_marker: inbox_marker.into(),
        }
    }

    /// True on the target host when the fragment names the inbox.
    ///
    /// An empty fragment or a bare `#` counts as inbox (first load, before the
    /// view is routed).
    #[must_use]
    pub fn allows(&self, page: &PageContext) -> bool {
        page.host.eq_ignore_ascii_case(&self.host) && self.is_inbox_fragment(&page.fragment)
    }

    fn is_inbox_fragment(&self, fragment: &str) -> bool {
        fragment.is_empty() || fragment == "#" || fragment.contains(&self.inbox_marker)
    }
}
