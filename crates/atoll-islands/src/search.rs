//! Search dialog island: trigger button plus modal dialog with debounced,
//! last-request-wins querying.
//!
//! # States
//!
//! ```text
//! closed ──open──▶ open-idle ──(debounce)──▶ open-loading ──▶ open-results
//!    ▲                ▲  ▲                        │        └─▶ open-error
//!    └──close─────────┘  └──── empty query ───────┘
//! ```
//!
//! The dialog never touches the network. Typing returns
//! [`SearchCommand::ArmDebounce`]; when that timer fires the dialog returns
//! [`SearchCommand::Issue`] with a fresh [`Seq`]. Responses come back through
//! [`SearchDialog::complete`] and are applied only when their sequence
//! number is still the latest issued.

use crate::bootstrap::IslandConfig;
use atoll_core::config::SearchConfig;
use atoll_core::dom::{Document, NodeId};
use atoll_core::gate::{Debounce, DebounceToken, Seq, SeqGate};
use atoll_core::{DialogState, DomError, SearchHit};
use std::time::Duration;

const DEFAULT_PLACEHOLDER: &str = "Search posts…";

/// Work the dialog asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// (Re)start the debounce timer; report back with the token after `delay`.
    ArmDebounce { token: DebounceToken, delay: Duration },
    /// Run `query` against the search endpoint.
    Issue { seq: Seq, query: String },
}

#[derive(Debug, Clone, Copy)]
struct Nodes {
    trigger: NodeId,
    root: NodeId,
    input: NodeId,
    status: NodeId,
    results: NodeId,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SearchDialog {
    state: DialogState,
    query: String,
    results: Vec<SearchHit>,
    error: Option<String>,
    gate: SeqGate,
    debounce: Debounce,
    /// Element focused before the dialog opened.
    prev_focus: Option<NodeId>,
    nodes: Nodes,
}

impl SearchDialog {
    /// Build the trigger and the (closed) dialog under `anchor`.
    ///
    /// `data-placeholder` and `data-debounce-ms` on the anchor override the
    /// defaults.
    pub fn mount(
        doc: &mut Document,
        anchor: NodeId,
        config: &IslandConfig,
        settings: &SearchConfig,
    ) -> anyhow::Result<Self> {
        let delay = match config.get("debounceMs") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("data-debounce-ms {raw:?}: {e}"))?,
            ),
            None => settings.debounce(),
        };
        let placeholder = config
            .get("placeholder")
            .map(String::as_str)
            .unwrap_or(DEFAULT_PLACEHOLDER);

        let trigger = doc.append_element(
            anchor,
            "button",
            &[
                ("type", "button"),
                ("class", "search-trigger"),
                ("aria-label", "Search"),
                ("aria-haspopup", "dialog"),
                ("aria-expanded", "false"),
            ],
        )?;
        doc.append_text(trigger, "Search")?;
        let kbd = doc.append_element(trigger, "kbd", &[])?;
        doc.append_text(kbd, settings.shortcut.clone())?;

        let root = doc.append_element(
            anchor,
            "div",
            &[
                ("class", "search-dialog"),
                ("role", "dialog"),
                ("aria-modal", "true"),
                ("aria-label", "Search"),
            ],
        )?;
        let input = doc.append_element(
            root,
            "input",
            &[
                ("type", "search"),
                ("class", "search-dialog-input"),
                ("aria-label", "Search posts"),
                ("autocomplete", "off"),
                ("placeholder", placeholder),
            ],
        )?;
        let status = doc.append_element(
            root,
            "p",
            &[
                ("class", "search-dialog-status"),
                ("role", "status"),
                ("aria-live", "polite"),
            ],
        )?;
        let results = doc.append_element(root, "ul", &[("class", "search-dialog-results")])?;

        let dialog = Self {
            state: DialogState::Closed,
            query: String::new(),
            results: Vec::new(),
            error: None,
            gate: SeqGate::default(),
            debounce: Debounce::new(delay),
            prev_focus: None,
            nodes: Nodes {
                trigger,
                root,
                input,
                status,
                results,
            },
        };
        dialog.render(doc)?;
        tracing::debug!(?delay, "search dialog mounted");
        Ok(dialog)
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce.delay()
    }

    pub fn trigger(&self) -> NodeId {
        self.nodes.trigger
    }

    pub fn root(&self) -> NodeId {
        self.nodes.root
    }

    pub fn input(&self) -> NodeId {
        self.nodes.input
    }

    pub fn results_list(&self) -> NodeId {
        self.nodes.results
    }

    /// Whether `node` is the trigger button or inside it.
    pub fn is_trigger(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(self.nodes.trigger, node)
    }

    /// Whether `node` lies inside the dialog region.
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(self.nodes.root, node)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// `closed → open-idle`. Returns `false` if the dialog was already open.
    pub fn open(&mut self, doc: &mut Document) -> bool {
        if self.is_open() {
            return false;
        }
        self.prev_focus = doc.active_element();
        self.state = DialogState::OpenIdle;
        self.sync(doc);
        if let Err(err) = doc.focus(self.nodes.input) {
            tracing::warn!(error = %err, "search: could not focus input");
        }
        tracing::debug!(prev_focus = ?self.prev_focus, "search: opened");
        true
    }

    /// `open-* → closed`. Clears the query, cancels the pending debounce and
    /// supersedes any in-flight request. Returns `false` if already closed.
    pub fn close(&mut self, doc: &mut Document) -> bool {
        if !self.is_open() {
            return false;
        }
        self.debounce.cancel();
        self.gate.supersede();
        self.query.clear();
        self.results.clear();
        self.error = None;
        self.state = DialogState::Closed;
        self.sync(doc);

        match self.prev_focus.take() {
            Some(prev) if doc.is_attached(prev) => {
                if let Err(err) = doc.focus(prev) {
                    tracing::warn!(error = %err, "search: could not restore focus");
                }
            }
            _ => doc.blur(),
        }
        tracing::debug!("search: closed");
        true
    }

    /// The input value changed.
    pub fn set_query(&mut self, doc: &mut Document, text: &str) -> Option<SearchCommand> {
        if !self.is_open() {
            return None;
        }
        self.query = text.to_string();

        if text.trim().is_empty() {
            self.debounce.cancel();
            self.gate.supersede();
            self.results.clear();
            self.error = None;
            self.state = DialogState::OpenIdle;
            self.sync(doc);
            return None;
        }

        let token = self.debounce.touch();
        tracing::debug!(query = %self.query, ?token, "search: debounce armed");
        Some(SearchCommand::ArmDebounce {
            token,
            delay: self.debounce.delay(),
        })
    }

    /// A debounce timer fired. Only the latest armed token issues a request.
    pub fn debounce_elapsed(
        &mut self,
        doc: &mut Document,
        token: DebounceToken,
    ) -> Option<SearchCommand> {
        if !self.is_open() || !self.debounce.fire(token) {
            tracing::debug!(?token, "search: stale debounce ignored");
            return None;
        }
        self.issue(doc)
    }

    /// Run the current query now, skipping any pending debounce.
    pub fn flush(&mut self, doc: &mut Document) -> Option<SearchCommand> {
        if !self.is_open() {
            return None;
        }
        self.debounce.cancel();
        self.issue(doc)
    }

    /// Apply the response for `seq`. Returns `true` if it was current and
    /// rendered, `false` if it was discarded.
    pub fn complete(
        &mut self,
        doc: &mut Document,
        seq: Seq,
        result: atoll_core::Result<Vec<SearchHit>>,
    ) -> bool {
        if !self.is_open() || !self.gate.settle(seq) {
            tracing::debug!(%seq, "search: stale response discarded");
            return false;
        }
        match result {
            Ok(hits) => {
                tracing::debug!(%seq, hits = hits.len(), "search: results");
                self.results = hits;
                self.error = None;
                self.state = DialogState::OpenResults;
            }
            Err(err) => {
                tracing::warn!(%seq, error = %err, "search: request failed");
                self.results.clear();
                self.error = Some(err.to_string());
                self.state = DialogState::OpenError;
            }
        }
        self.sync(doc);
        true
    }

    /// Empty and whitespace-only queries are rejected without a request.
    fn issue(&mut self, doc: &mut Document) -> Option<SearchCommand> {
        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();
        let seq = self.gate.issue();
        self.results.clear();
        self.error = None;
        self.state = DialogState::OpenLoading;
        self.sync(doc);
        tracing::debug!(%seq, query = %query, "search: request issued");
        Some(SearchCommand::Issue { seq, query })
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn sync(&self, doc: &mut Document) {
        if let Err(err) = self.render(doc) {
            tracing::warn!(error = %err, "search: render failed");
        }
    }

    fn render(&self, doc: &mut Document) -> Result<(), DomError> {
        let Nodes {
            trigger,
            root,
            input,
            status,
            results,
        } = self.nodes;

        let open = self.is_open();
        doc.set_attr(trigger, "aria-expanded", if open { "true" } else { "false" })?;
        if open {
            doc.remove_attr(root, "hidden")?;
            doc.remove_attr(root, "aria-hidden")?;
        } else {
            doc.set_attr(root, "hidden", "")?;
            doc.set_attr(root, "aria-hidden", "true")?;
        }
        if self.state == DialogState::OpenLoading {
            doc.set_attr(root, "aria-busy", "true")?;
        } else {
            doc.remove_attr(root, "aria-busy")?;
        }
        doc.set_attr(root, "data-state", &self.state.to_string())?;

        if doc.value(input) != self.query {
            doc.set_value(input, &self.query)?;
        }

        let message = match self.state {
            DialogState::Closed | DialogState::OpenIdle => String::new(),
            DialogState::OpenLoading => "Searching…".to_string(),
            DialogState::OpenResults => match self.results.len() {
                0 => "No results".to_string(),
                1 => "1 result".to_string(),
                n => format!("{n} results"),
            },
            DialogState::OpenError => format!(
                "Search failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
        };
        doc.set_text(status, message)?;

        doc.remove_children(results)?;
        if self.state == DialogState::OpenResults {
            doc.remove_attr(results, "hidden")?;
            for hit in &self.results {
                let li = doc.append_element(results, "li", &[("class", "search-dialog-result")])?;
                let a = doc.append_element(li, "a", &[("href", &hit.url)])?;
                let title = doc.append_element(a, "span", &[("class", "search-result-title")])?;
                doc.append_text(title, hit.title.clone())?;
                if !hit.excerpt.is_empty() {
                    let excerpt =
                        doc.append_element(a, "span", &[("class", "search-result-excerpt")])?;
                    doc.append_text(excerpt, hit.excerpt.clone())?;
                }
            }
        } else {
            doc.set_attr(results, "hidden", "")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
