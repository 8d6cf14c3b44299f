//! The reference site running on a random TCP port bound to 127.0.0.1.
//!
//! ```rust,ignore
//! let site = TestSite::start().await.unwrap();
//! let (status, headers, body) = site.get("/blog?tag=rust", &[("HX-Request", "true")]).await;
//! ```

use atoll::site::{router, sample_posts, Site};
use atoll_core::config::{FragmentConfig, SearchConfig};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::HeaderMap;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

pub struct TestSite {
    addr: SocketAddr,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl TestSite {
    /// Start the site with the built-in posts and default configuration.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let site = Site::new(
            sample_posts(),
            SearchConfig::default(),
            FragmentConfig::default(),
        );
        let app = router(Arc::new(site));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { addr, client })
    }

    /// Base URL (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn url(&self, path: &str) -> Url {
        self.base_url().join(path).unwrap()
    }

    /// GET `path` and return status, headers and body.
    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> (u16, HeaderMap, String) {
        let mut request = hyper::Request::get(self.url(path).as_str());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = self
            .client
            .request(request.body(Empty::new()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    /// GET a full page and return its body, asserting 200.
    pub async fn page(&self, path: &str) -> String {
        let (status, _, body) = self.get(path, &[]).await;
        assert_eq!(status, 200, "GET {path}");
        body
    }
}
