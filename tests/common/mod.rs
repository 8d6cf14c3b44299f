//! Shared test utilities for atoll integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Scripted sources resolve on tokio timers, so harnesses
//! running under `#[tokio::test(start_paused = true)]` are deterministic.

pub mod assertions;
pub mod builders;
pub mod fake_sources;
pub mod fixtures;
pub mod test_site;

pub use builders::*;
pub use fake_sources::*;
pub use fixtures::*;
