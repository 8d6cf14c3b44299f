//! atoll-core: shared model for the atoll client delivery core.
//!
//! This crate holds everything the islands need that is not itself an island:
//! the arena [`dom::Document`], the [`gate`] primitives that implement
//! last-request-wins, the append/replace-only [`history::History`], the
//! configuration layer and the shared data types.
//!
//! # Architecture
//!
//! ```text
//! DomEvent ──► Page ──► Island controllers ──► Effect
//!                ▲                               │
//!                └──── Completion ◄── Runtime ◄──┘
//! ```
//!
//! Controllers are synchronous state machines; only the runtime driver in
//! `atoll-islands` touches timers and the network.

pub mod config;
pub mod dom;
pub mod error;
pub mod gate;
pub mod history;
pub mod types;

pub use error::{DomError, Error, Result};
pub use types::{DialogState, FragmentResponse, SearchHit, SearchPayload, TocEntry};
