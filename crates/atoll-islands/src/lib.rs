//! atoll islands: interactive components mounted onto server-rendered pages.
//!
//! Each island attaches to its own anchor element through [`bootstrap::mount`]
//! and owns its state exclusively. The [`page::Page`] shell routes DOM events
//! to them and collects the [`page::Effect`]s they request; the
//! [`runtime::Runtime`] performs those effects (timers, fetches) and feeds the
//! completions back in.

pub mod bootstrap;
pub mod event;
pub mod nav;
pub mod page;
pub mod runtime;
pub mod search;
pub mod toc;

pub use page::{Effect, Page};
pub use runtime::Runtime;
