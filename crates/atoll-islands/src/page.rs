//! Page shell: the document, its history, and the islands mounted on it.
//!
//! [`Page::boot`] mounts every island the page carries. [`Page::handle`]
//! routes DOM events to them and returns the [`Effect`]s the host must
//! perform. Completions of those effects come back through
//! [`Page::debounce_elapsed`], [`Page::search_completed`] and
//! [`Page::fragment_completed`]. Nothing here awaits.

use crate::{
    bootstrap,
    event::{self, DomEvent, PageEvent},
    nav::{self, FragmentNav, Intercept, Swap},
    search::{SearchCommand, SearchDialog},
    toc::TableOfContents,
};
use atoll_core::{
    config::Config,
    dom::{Document, NodeId},
    gate::{DebounceToken, Seq},
    history::History,
    FragmentResponse, SearchHit,
};
use std::time::Duration;
use url::Url;

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Work requested by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call [`Page::debounce_elapsed`] with `token` after `delay`.
    ArmDebounce { token: DebounceToken, delay: Duration },
    /// Query the search endpoint; report through [`Page::search_completed`].
    Search { seq: Seq, query: String },
    /// Fetch `url` as a fragment; report through [`Page::fragment_completed`].
    FetchFragment { seq: Seq, url: Url },
    /// Leave the page: the browser loads `url` in full.
    Navigate { url: Url },
}

impl From<SearchCommand> for Effect {
    fn from(cmd: SearchCommand) -> Self {
        match cmd {
            SearchCommand::ArmDebounce { token, delay } => Effect::ArmDebounce { token, delay },
            SearchCommand::Issue { seq, query } => Effect::Search { seq, query },
        }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

pub struct Page {
    doc: Document,
    history: History,
    config: Config,
    search: Option<SearchDialog>,
    toc: Option<TableOfContents>,
    nav: FragmentNav,
}

impl Page {
    /// Mount the islands onto a server-rendered document loaded from `url`.
    /// Islands whose anchor is absent or whose mount fails are skipped.
    pub fn boot(mut doc: Document, url: Url, config: Config) -> Self {
        let search = bootstrap::mount(&mut doc, &config.search.anchor_id, |doc, anchor, data| {
            SearchDialog::mount(doc, anchor, data, &config.search)
        })
        .into_mounted();
        let toc = bootstrap::mount(&mut doc, &config.toc.anchor_id, |doc, anchor, data| {
            TableOfContents::mount(doc, anchor, data, &config.toc)
        })
        .into_mounted();

        tracing::debug!(
            %url,
            search = search.is_some(),
            toc = toc.is_some(),
            "page booted"
        );
        Self {
            doc,
            history: History::new(url),
            nav: FragmentNav::new(config.fragment.clone()),
            config,
            search,
            toc,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn url(&self) -> &Url {
        self.history.url()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search(&self) -> Option<&SearchDialog> {
        self.search.as_ref()
    }

    pub fn toc(&self) -> Option<&TableOfContents> {
        self.toc.as_ref()
    }

    pub fn nav(&self) -> &FragmentNav {
        &self.nav
    }

    /// Insert mode: focus sits in a control that accepts typed text.
    fn is_insert_mode(&self) -> bool {
        self.doc
            .active_element()
            .is_some_and(|n| self.doc.is_editable(n))
    }

    pub fn handle(&mut self, event: DomEvent) -> Vec<Effect> {
        let mapped = if self.is_insert_mode() {
            event::to_page_event_insert(event)
        } else {
            event::to_page_event(event, self.config.search.shortcut_key())
        };
        let Some(event) = mapped else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        match event {
            PageEvent::OpenSearch => {
                if let Some(search) = &mut self.search {
                    search.open(&mut self.doc);
                }
            }

            PageEvent::Dismiss => {
                if let Some(search) = &mut self.search {
                    search.close(&mut self.doc);
                }
            }

            PageEvent::Submit => {
                if let Some(search) = &mut self.search {
                    effects.extend(search.flush(&mut self.doc).map(Effect::from));
                }
            }

            PageEvent::QueryChanged { target, value } => {
                if let Err(err) = self.doc.set_value(target, &value) {
                    tracing::debug!(error = %err, "input on a non-element ignored");
                    return effects;
                }
                if let Some(search) = &mut self.search {
                    if search.input() == target {
                        effects.extend(search.set_query(&mut self.doc, &value).map(Effect::from));
                    }
                }
            }

            PageEvent::Click { target, plain } => self.click(target, plain, &mut effects),

            PageEvent::Scrolled { scroll_y, tops } => {
                self.history.set_scroll(scroll_y);
                if let Some(toc) = &mut self.toc {
                    toc.track(&mut self.doc, &tops);
                }
            }

            PageEvent::Back => {
                if let Some(url) = self.history.back().map(|e| e.url.clone()) {
                    self.restore(url, &mut effects);
                }
            }

            PageEvent::Forward => {
                if let Some(url) = self.history.forward().map(|e| e.url.clone()) {
                    self.restore(url, &mut effects);
                }
            }
        }
        effects
    }

    fn click(&mut self, target: NodeId, plain: bool, effects: &mut Vec<Effect>) {
        if let Some(search) = &mut self.search {
            if search.is_trigger(&self.doc, target) {
                if plain {
                    search.open(&mut self.doc);
                }
                return;
            }
            if search.is_open() && !search.contains(&self.doc, target) {
                tracing::debug!("search: click outside");
                search.close(&mut self.doc);
            }
        }

        match self.nav.intercept(&self.doc, target, self.history.url(), plain) {
            Intercept::Fetch { seq, url } => effects.push(Effect::FetchFragment { seq, url }),
            Intercept::Default if plain => {
                let current = self.history.url();
                if let Some((_, url)) = nav::link_target(&self.doc, target, current) {
                    if !(url.fragment().is_some() && nav::same_document(&url, current)) {
                        effects.push(Effect::Navigate { url });
                    }
                }
            }
            Intercept::Default => {}
        }
    }

    fn restore(&mut self, url: Url, effects: &mut Vec<Effect>) {
        match self.nav.restore(&self.doc, url.clone()) {
            Intercept::Fetch { seq, url } => effects.push(Effect::FetchFragment { seq, url }),
            Intercept::Default => effects.push(Effect::Navigate { url }),
        }
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    pub fn debounce_elapsed(&mut self, token: DebounceToken) -> Vec<Effect> {
        let Some(search) = &mut self.search else {
            return Vec::new();
        };
        search
            .debounce_elapsed(&mut self.doc, token)
            .map(Effect::from)
            .into_iter()
            .collect()
    }

    /// Returns `true` if the response was current and rendered.
    pub fn search_completed(
        &mut self,
        seq: Seq,
        result: atoll_core::Result<Vec<SearchHit>>,
    ) -> bool {
        match &mut self.search {
            Some(search) => search.complete(&mut self.doc, seq, result),
            None => false,
        }
    }

    pub fn fragment_completed(
        &mut self,
        seq: Seq,
        result: atoll_core::Result<FragmentResponse>,
    ) -> Vec<Effect> {
        match self
            .nav
            .complete(&mut self.doc, &mut self.history, seq, result)
        {
            Swap::Fallback { url } => vec![Effect::Navigate { url }],
            Swap::Applied { .. } | Swap::Stale => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
