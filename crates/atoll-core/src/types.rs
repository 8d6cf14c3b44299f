//! Core types for atoll-core.
//!
//! This module defines the data that flows between the islands and the
//! server: search hits and payloads, table-of-contents entries, fragment
//! responses, and the [`DialogState`] of the search dialog.

use serde::{Deserialize, Serialize};
use url::Url;

/// One record returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    /// Link target; absolute or root-relative.
    pub url: String,
    /// Plain-text snippet around the match. May be empty.
    #[serde(default)]
    pub excerpt: String,
}

/// Body of a successful `GET /api/search?q=...` response.
///
/// An empty `results` vector is a valid answer ("no matches") and is distinct
/// from the dialog never having issued a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// A heading discovered in the content region, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub heading_id: String,
    pub text: String,
    /// Heading rank, 1 for `h1` through 6 for `h6`.
    pub level: u8,
}

/// A replacement fragment for the partial-update container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentResponse {
    /// Markup to place inside the container. Never a full document.
    pub html: String,
    /// Canonical URL to push onto the history stack.
    pub url: Url,
}

/// Search dialog state. Exactly one instance per dialog controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogState {
    #[default]
    Closed,
    OpenIdle,
    OpenLoading,
    OpenResults,
    OpenError,
}

impl DialogState {
    pub fn is_open(self) -> bool {
        !matches!(self, DialogState::Closed)
    }
}

impl std::fmt::Display for DialogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogState::Closed => write!(f, "closed"),
            DialogState::OpenIdle => write!(f, "open-idle"),
            DialogState::OpenLoading => write!(f, "open-loading"),
            DialogState::OpenResults => write!(f, "open-results"),
            DialogState::OpenError => write!(f, "open-error"),
        }
    }
}
