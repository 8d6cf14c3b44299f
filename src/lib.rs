//! atoll: interactive islands for server-rendered pages.
//!
//! The workspace is split the way the runtime is layered:
//!
//! ```text
//! atoll-core ──► atoll-net ──► atoll-islands
//!  (dom, gate,     (hyper        (bootstrap, search dialog, toc,
//!   config)         transports)   fragment nav, page, runtime)
//! ```
//!
//! This crate adds the [`site`] module, a reference blog served by
//! `atoll serve` that renders the anchors, fragments and search endpoint the
//! islands expect, and the `atoll` binary.

pub mod site;
