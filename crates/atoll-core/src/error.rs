//! Error types shared by every atoll crate.
//!
//! Nothing in the client core is fatal to the page: transports map every
//! failure into [`Error`] and the controllers decide whether that becomes an
//! in-dialog error state or a fallback to standard navigation.

use crate::dom::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connect refused, reset, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// The response arrived but could not be decoded.
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Misuse of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Appending would make a node its own ancestor, or re-parent the root.
    #[error("cannot append {child:?} under {parent:?}")]
    Hierarchy { parent: NodeId, child: NodeId },
}
