//! hyper-backed HTTP transport.
//!
//! One [`HttpClient`] serves both contracts:
//!
//! - **search**: `GET {endpoint}?{query_param}={query}` with
//!   `Accept: application/json`, decoded as a
//!   [`SearchPayload`](atoll_core::SearchPayload);
//! - **fragment**: `GET {href}` with `{request_header}: true`. The server
//!   answers with the fragment only, and names the canonical URL in the
//!   `{push_url_header}` response header. A body that is still a full
//!   document means the server ignored the request header; that is treated
//!   as a malformed response so the caller falls back to a full load.
//!
//! Only plain `http://` origins are supported; anything else surfaces as a
//! transport error.

use atoll_core::config::{Config, FragmentConfig, SearchConfig};
use atoll_core::{Error, FragmentResponse, Result, SearchHit, SearchPayload};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, ACCEPT};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::{FragmentSource, SearchSource};

#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    base: Url,
    search: SearchConfig,
    fragment: FragmentConfig,
}

struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpClient {
    pub fn new(base: Url, search: SearchConfig, fragment: FragmentConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            client,
            base,
            search,
            fragment,
        }
    }

    /// Build a client for `site.base_url` with the configured endpoints.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.site.base_url)?;
        Ok(Self::new(
            base,
            config.search.clone(),
            config.fragment.clone(),
        ))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute search URL for `query`, resolved against the base origin.
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base.join(&self.search.endpoint)?;
        url.query_pairs_mut()
            .append_pair(&self.search.query_param, query);
        Ok(url)
    }

    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<RawResponse> {
        let uri: hyper::Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::Transport(format!("{url}: {e}")))?;
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder
            .body(Full::new(Bytes::new()))
            .map_err(|e| Error::Transport(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| Error::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Transport(format!("{url}: {e}")))?
            .to_bytes();

        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "http get");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl SearchSource for HttpClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = self.search_url(query)?;
        let raw = self.get(&url, &[(ACCEPT.as_str(), "application/json")]).await?;
        let payload: SearchPayload = serde_json::from_slice(&raw.body)
            .map_err(|e| Error::Malformed(format!("search payload: {e}")))?;
        Ok(payload.results)
    }
}

impl FragmentSource for HttpClient {
    async fn fetch_fragment(&self, url: &Url) -> Result<FragmentResponse> {
        let raw = self
            .get(url, &[(self.fragment.request_header.as_str(), "true")])
            .await?;

        let html = String::from_utf8(raw.body.to_vec())
            .map_err(|_| Error::Malformed(format!("{url}: fragment is not UTF-8")))?;
        if looks_like_full_document(&html) {
            return Err(Error::Malformed(format!(
                "{url}: expected a fragment, got a full document (status {})",
                raw.status.as_u16()
            )));
        }

        let canonical = raw
            .headers
            .get(self.fragment.push_url_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|v| url.join(v))
            .transpose()?
            .unwrap_or_else(|| url.clone());

        Ok(FragmentResponse {
            html,
            url: canonical,
        })
    }
}

fn looks_like_full_document(html: &str) -> bool {
    let head: String = html
        .trim_start()
        .chars()
        .take(64)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
