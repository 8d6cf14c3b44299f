//! Runtime driver: performs a [`Page`]'s effects and feeds completions back.
//!
//! Timers and fetches are kept in a [`FuturesUnordered`] and polled on the
//! calling task, so the driver needs no `Send` bounds and runs on a
//! current-thread runtime. User events are applied synchronously in arrival
//! order by [`Runtime::dispatch`]; completions are applied one at a time by
//! [`Runtime::step`] in whatever order they finish. Staleness is decided by
//! the islands, never here.

use crate::page::{Effect, Page};
use crate::event::DomEvent;
use atoll_core::gate::{DebounceToken, Seq};
use atoll_core::{FragmentResponse, SearchHit};
use atoll_net::{FragmentSource, SearchSource};
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::rc::Rc;
use std::time::Duration;
use url::Url;

/// A finished timer or request.
#[derive(Debug)]
pub enum Completion {
    Debounce(DebounceToken),
    Search(Seq, atoll_core::Result<Vec<SearchHit>>),
    Fragment(Seq, atoll_core::Result<FragmentResponse>),
}

pub struct Runtime<S, F> {
    page: Page,
    search: Rc<S>,
    fragments: Rc<F>,
    pending: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
    navigations: Vec<Url>,
}

impl<S, F> Runtime<S, F>
where
    S: SearchSource + 'static,
    F: FragmentSource + 'static,
{
    pub fn new(page: Page, search: S, fragments: F) -> Self {
        Self {
            page,
            search: Rc::new(search),
            fragments: Rc::new(fragments),
            pending: FuturesUnordered::new(),
            navigations: Vec::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Full-page navigations requested so far, oldest first.
    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }

    /// Timers and requests not yet completed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Apply a user event and schedule whatever it requests.
    pub fn dispatch(&mut self, event: DomEvent) {
        let effects = self.page.handle(event);
        self.schedule(effects);
    }

    fn schedule(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmDebounce { token, delay } => {
                    self.pending.push(
                        async move {
                            tokio::time::sleep(delay).await;
                            Completion::Debounce(token)
                        }
                        .boxed_local(),
                    );
                }
                Effect::Search { seq, query } => {
                    let source = Rc::clone(&self.search);
                    self.pending.push(
                        async move {
                            let result = source.search(&query).await;
                            Completion::Search(seq, result)
                        }
                        .boxed_local(),
                    );
                }
                Effect::FetchFragment { seq, url } => {
                    let source = Rc::clone(&self.fragments);
                    self.pending.push(
                        async move {
                            let result = source.fetch_fragment(&url).await;
                            Completion::Fragment(seq, result)
                        }
                        .boxed_local(),
                    );
                }
                Effect::Navigate { url } => {
                    tracing::info!(%url, "full navigation");
                    self.navigations.push(url);
                }
            }
        }
    }

    fn apply(&mut self, completion: Completion) {
        let effects = match completion {
            Completion::Debounce(token) => self.page.debounce_elapsed(token),
            Completion::Search(seq, result) => {
                self.page.search_completed(seq, result);
                Vec::new()
            }
            Completion::Fragment(seq, result) => self.page.fragment_completed(seq, result),
        };
        self.schedule(effects);
    }

    /// Wait for the next completion and apply it. Returns `false` when
    /// nothing is pending.
    pub async fn step(&mut self) -> bool {
        match self.pending.next().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is pending. Never returns while a
    /// source hangs; use [`Runtime::run_for`] for those.
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }

    /// Apply every completion that finishes within `window`, then return.
    /// Time always advances by the full window.
    pub async fn run_for(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.pending.next()).await {
                Ok(Some(completion)) => self.apply(completion),
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    break;
                }
                Err(_) => break,
            }
        }
    }
}
