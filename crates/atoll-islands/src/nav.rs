//! Partial-update navigation.
//!
//! Links marked for enhancement (the marker attribute on the link or any
//! ancestor) are fetched as fragments and swapped into the target container
//! instead of loading a whole page. Every case the layer cannot handle falls
//! back to the browser's default navigation, so a marked link behaves exactly
//! like a plain one when anything goes wrong.

use atoll_core::config::FragmentConfig;
use atoll_core::dom::{Document, NodeId};
use atoll_core::gate::{Seq, SeqGate};
use atoll_core::history::History;
use atoll_core::FragmentResponse;
use url::Url;

/// Outcome of a link activation or history step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    /// Prevent the default and fetch `url` as a fragment.
    Fetch { seq: Seq, url: Url },
    /// Let the browser handle it.
    Default,
}

/// Outcome of a fragment completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Swap {
    /// The container now holds the fragment and history points at `url`.
    Applied { url: Url },
    /// A newer activation superseded this one; nothing changed.
    Stale,
    /// The partial update failed; the caller should load `url` in full.
    Fallback { url: Url },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Link activation: a successful swap pushes a history entry.
    Push,
    /// Back/forward: history already moved, only the content is restored.
    Restore,
}

#[derive(Debug)]
struct Pending {
    seq: Seq,
    url: Url,
    mode: Mode,
}

/// Closest `a[href]` at or above `node`, with its href resolved against
/// `base`.
pub fn link_target(doc: &Document, node: NodeId, base: &Url) -> Option<(NodeId, Url)> {
    let link = doc.closest(node, |d, n| d.tag(n) == Some("a") && d.has_attr(n, "href"))?;
    let href = doc.attr(link, "href")?;
    match base.join(href) {
        Ok(url) => Some((link, url)),
        Err(err) => {
            tracing::debug!(href, error = %err, "unresolvable href");
            None
        }
    }
}

#[derive(Debug)]
pub struct FragmentNav {
    settings: FragmentConfig,
    gate: SeqGate,
    pending: Option<Pending>,
}

impl FragmentNav {
    pub fn new(settings: FragmentConfig) -> Self {
        Self {
            settings,
            gate: SeqGate::default(),
            pending: None,
        }
    }

    pub fn settings(&self) -> &FragmentConfig {
        &self.settings
    }

    pub fn in_flight(&self) -> bool {
        self.gate.in_flight()
    }

    fn container(&self, doc: &Document) -> Option<NodeId> {
        doc.get_element_by_id(&self.settings.container_id)
    }

    fn is_marked(&self, doc: &Document, link: NodeId) -> bool {
        doc.closest(link, |d, n| d.has_attr(n, &self.settings.marker_attr))
            .is_some()
    }

    /// Decide whether a click on `target` becomes a fragment fetch.
    ///
    /// `plain` is a primary-button click with no modifiers; anything else
    /// (new tab, download, context menu) is the browser's business.
    pub fn intercept(
        &mut self,
        doc: &Document,
        target: NodeId,
        current: &Url,
        plain: bool,
    ) -> Intercept {
        let Some((link, url)) = link_target(doc, target, current) else {
            return Intercept::Default;
        };
        if !self.is_marked(doc, link) {
            return Intercept::Default;
        }
        if !plain {
            tracing::debug!(%url, "fragment: modified click left to the browser");
            return Intercept::Default;
        }
        if doc.has_attr(link, "download") || doc.attr(link, "target").is_some_and(|t| t != "_self")
        {
            return Intercept::Default;
        }
        if url.origin() != current.origin() {
            tracing::debug!(%url, "fragment: cross-origin link left to the browser");
            return Intercept::Default;
        }
        if url.fragment().is_some() && same_document(&url, current) {
            return Intercept::Default;
        }
        if self.container(doc).is_none() {
            tracing::debug!(
                container = %self.settings.container_id,
                "fragment: no container on this page"
            );
            return Intercept::Default;
        }
        self.begin(url, Mode::Push)
    }

    /// History moved to `url`; restore its content without a new entry.
    /// Returns [`Intercept::Default`] when the container is gone, meaning
    /// the caller should load `url` in full.
    pub fn restore(&mut self, doc: &Document, url: Url) -> Intercept {
        if self.container(doc).is_none() {
            return Intercept::Default;
        }
        self.begin(url, Mode::Restore)
    }

    fn begin(&mut self, url: Url, mode: Mode) -> Intercept {
        let seq = self.gate.issue();
        tracing::debug!(%seq, %url, ?mode, "fragment: fetch issued");
        self.pending = Some(Pending {
            seq,
            url: url.clone(),
            mode,
        });
        Intercept::Fetch { seq, url }
    }

    /// Apply the fragment fetched for `seq`.
    pub fn complete(
        &mut self,
        doc: &mut Document,
        history: &mut History,
        seq: Seq,
        result: atoll_core::Result<FragmentResponse>,
    ) -> Swap {
        if !self.gate.settle(seq) {
            tracing::debug!(%seq, "fragment: stale response discarded");
            return Swap::Stale;
        }
        let Some(pending) = self.pending.take().filter(|p| p.seq == seq) else {
            return Swap::Stale;
        };

        let fragment = match result {
            Ok(fragment) => fragment,
            Err(err) => {
                tracing::warn!(url = %pending.url, error = %err, "fragment: falling back to full navigation");
                return Swap::Fallback { url: pending.url };
            }
        };
        let Some(container) = self.container(doc) else {
            tracing::warn!(url = %pending.url, "fragment: container vanished before swap");
            return Swap::Fallback { url: pending.url };
        };
        if let Err(err) = doc.set_inner_markup(container, &fragment.html) {
            tracing::warn!(url = %pending.url, error = %err, "fragment: swap failed");
            return Swap::Fallback { url: pending.url };
        }

        let url = fragment.url;
        match pending.mode {
            Mode::Push if *history.url() != url => history.push(url.clone()),
            Mode::Push | Mode::Restore => history.replace(url.clone()),
        }
        tracing::debug!(%seq, %url, "fragment: swapped");
        Swap::Applied { url }
    }
}

/// `a` and `b` differ at most in their `#fragment`.
pub fn same_document(a: &Url, b: &Url) -> bool {
    a[..url::Position::AfterQuery] == b[..url::Position::AfterQuery]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
