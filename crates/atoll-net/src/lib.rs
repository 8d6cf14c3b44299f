//! atoll-net: transports for the search endpoint and fragment fetches.
//!
//! The islands never talk to the network directly. The runtime driver holds
//! a [`SearchSource`] and a [`FragmentSource`] and turns their results into
//! completions. [`http::HttpClient`] implements both over hyper; tests plug in
//! scripted implementations.
//!
//! Neither trait offers cancellation: a superseded request simply runs to
//! completion and its result is discarded by sequence-number gating.

pub mod http;

use atoll_core::{FragmentResponse, Result, SearchHit};
use std::future::Future;
use url::Url;

/// Anything that can answer a search query.
///
/// Implementations must map every failure (transport error, non-2xx status,
/// undecodable body) to an `Err`.
pub trait SearchSource {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchHit>>>;
}

/// Anything that can fetch a fragment representation of a page URL.
pub trait FragmentSource {
    fn fetch_fragment(&self, url: &Url) -> impl Future<Output = Result<FragmentResponse>>;
}
