//! Scripted [`SearchSource`] and [`FragmentSource`] implementations.
//!
//! Each source answers from a script keyed by query (or by URL path and
//! query) and records every call in a shared [`CallLog`] that stays readable
//! after the source has been moved into a `Runtime`.
//!
//! ```rust,ignore
//! let search = ScriptedSearch::new()
//!     .reply("rus", Reply::ok(hits_for("rus")).after(ms(300)))
//!     .reply("rust", Reply::ok(hits_for("rust")).after(ms(50)));
//! let log = search.log();
//! ```

use atoll_core::{Error, FragmentResponse, Result, SearchHit};
use atoll_net::{FragmentSource, SearchSource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use url::Url;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ---------------------------------------------------------------------------
// Call log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<(String, tokio::time::Instant)>>>);

impl CallLog {
    fn record(&self, call: &str) {
        self.0
            .borrow_mut()
            .push((call.to_string(), tokio::time::Instant::now()));
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    /// When each call was made.
    pub fn times(&self) -> Vec<tokio::time::Instant> {
        self.0.borrow().iter().map(|(_, t)| *t).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Outcome<T> {
    Ok(T),
    Status(u16),
    Malformed,
    Never,
}

/// How a scripted source answers one call.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    delay: Duration,
    outcome: Outcome<T>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Ok(value),
        }
    }

    /// Answer with a non-2xx status.
    pub fn status(code: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Status(code),
        }
    }

    pub fn malformed() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Malformed,
        }
    }

    /// Never resolve.
    pub fn never() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Never,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn resolve(self, target: &str) -> Result<T> {
        tokio::time::sleep(self.delay).await;
        match self.outcome {
            Outcome::Ok(value) => Ok(value),
            Outcome::Status(status) => Err(Error::Status {
                status,
                url: target.to_string(),
            }),
            Outcome::Malformed => Err(Error::Malformed(format!("{target}: not json"))),
            Outcome::Never => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Unscripted queries answer immediately with [`hits_for`](super::hits_for).
#[derive(Default)]
pub struct ScriptedSearch {
    script: HashMap<String, Reply<Vec<SearchHit>>>,
    fallback: Option<Reply<Vec<SearchHit>>>,
    log: CallLog,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, query: &str, reply: Reply<Vec<SearchHit>>) -> Self {
        self.script.insert(query.to_string(), reply);
        self
    }

    /// Answer every unscripted query with `reply`.
    pub fn otherwise(mut self, reply: Reply<Vec<SearchHit>>) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl SearchSource for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.log.record(query);
        let reply = self
            .script
            .get(query)
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| Reply::ok(super::hits_for(query)));
        reply.resolve(&format!("/api/search?q={query}")).await
    }
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Keyed by path plus query (`/blog?tag=rust`). Unscripted URLs answer with
/// [`post_list_fragment`](super::post_list_fragment) for their `tag`.
#[derive(Default)]
pub struct ScriptedFragments {
    script: HashMap<String, Reply<String>>,
    log: CallLog,
}

impl ScriptedFragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, path: &str, reply: Reply<String>) -> Self {
        self.script.insert(path.to_string(), reply);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    }
}

impl FragmentSource for ScriptedFragments {
    async fn fetch_fragment(&self, url: &Url) -> Result<FragmentResponse> {
        let key = path_and_query(url);
        self.log.record(&key);
        let reply = self.script.get(&key).cloned().unwrap_or_else(|| {
            let tag = url
                .query_pairs()
                .find(|(k, _)| k == "tag")
                .map(|(_, v)| v.into_owned());
            Reply::ok(super::post_list_fragment(tag.as_deref()))
        });
        let html = reply.resolve(&key).await?;
        Ok(FragmentResponse {
            html,
            url: url.clone(),
        })
    }
}
