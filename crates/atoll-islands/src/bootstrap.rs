//! Island mount bootstrap.
//!
//! [`mount`] is the whole contract between the server render and an island:
//! find the anchor by id, hand its `data-*` attributes to the factory as a
//! flat map, and instantiate the island exactly once. A missing anchor is the
//! normal case on pages that do not carry the island, so it is a silent
//! no-op. A failing factory is logged and swallowed so that every other
//! island on the page still mounts.

use atoll_core::dom::{Document, NodeId};
use std::collections::BTreeMap;

/// Declarative configuration read from the anchor's `data-*` attributes.
pub type IslandConfig = BTreeMap<String, String>;

#[derive(Debug)]
pub enum MountOutcome<T> {
    /// No element with the anchor id; nothing was touched.
    Absent,
    Mounted(T),
    /// The factory failed or removed its own anchor. The error has already
    /// been logged.
    Failed(anyhow::Error),
}

impl<T> MountOutcome<T> {
    pub fn is_mounted(&self) -> bool {
        matches!(self, MountOutcome::Mounted(_))
    }

    pub fn into_mounted(self) -> Option<T> {
        match self {
            MountOutcome::Mounted(island) => Some(island),
            _ => None,
        }
    }
}

/// Mount one island onto the element with id `anchor_id`.
///
/// The factory may append children to the anchor but must leave the anchor
/// itself in place; an island that detaches its anchor is reported as
/// failed.
pub fn mount<T, F>(doc: &mut Document, anchor_id: &str, factory: F) -> MountOutcome<T>
where
    F: FnOnce(&mut Document, NodeId, &IslandConfig) -> anyhow::Result<T>,
{
    let Some(anchor) = doc.get_element_by_id(anchor_id) else {
        tracing::debug!(anchor = anchor_id, "no anchor on this page, island skipped");
        return MountOutcome::Absent;
    };

    let config = doc.data_attributes(anchor);
    tracing::debug!(anchor = anchor_id, ?config, "mounting island");

    match factory(doc, anchor, &config) {
        Ok(_) if !doc.is_attached(anchor) => {
            let err = anyhow::anyhow!("island #{anchor_id} detached its own anchor");
            tracing::warn!(anchor = anchor_id, "{err}");
            MountOutcome::Failed(err)
        }
        Ok(island) => MountOutcome::Mounted(island),
        Err(err) => {
            tracing::warn!(anchor = anchor_id, error = %err, "island failed to mount");
            MountOutcome::Failed(err)
        }
    }
}
