//! Reference site: a small server-rendered blog the islands run against.
//!
//! Every page works without scripts: anchors are rendered empty, every link
//! is a real `<a href>`, the post page carries a static `#toc-nav`, and
//! `/search?q=` renders results as a plain page. Requests carrying the
//! fragment header (`HX-Request: true` by default) get only the swappable
//! part of the page plus the canonical URL in the push-url header.
//!
//! # Routes
//!
//! | Route              | Full page          | Fragment request          |
//! |--------------------|--------------------|---------------------------|
//! | `/`                | latest posts       | same as full              |
//! | `/blog?tag&skip`   | tag list + posts   | `#post-list` contents     |
//! | `/blog/{slug}`     | post with ToC      | same as full              |
//! | `/search?q`        | results page       | results list              |
//! | `/api/search?q`    | JSON               | JSON                      |
//! | anything else      | 404 page           | 404 page                  |

use atoll_core::config::{FragmentConfig, SearchConfig};
use atoll_core::dom::escape_html;
use atoll_core::{SearchHit, SearchPayload};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use url::form_urlencoded;

/// Posts per `/blog` page.
pub const PAGE_SIZE: usize = 10;
/// Posts on the home page.
const HOME_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Section {
    /// 2 or 3.
    pub level: u8,
    pub id: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
}

impl Post {
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.summary.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.contains(needle))
    }

    fn hit(&self) -> SearchHit {
        SearchHit {
            title: self.title.clone(),
            url: format!("/blog/{}", self.slug),
            excerpt: self.summary.clone(),
        }
    }
}

fn section(level: u8, id: &str, title: &str, body: &str) -> Section {
    Section {
        level,
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
    }
}

/// Built-in posts served by `atoll serve`. Newest first. There are more than
/// [`PAGE_SIZE`] so that `/blog` paginates.
pub fn sample_posts() -> Vec<Post> {
    let mut posts = vec![
        Post {
            slug: "islands-on-a-server-rendered-blog".into(),
            title: "Islands on a server-rendered blog".into(),
            summary: "Mounting small interactive components onto plain HTML.".into(),
            tags: vec!["rust".into(), "web".into()],
            sections: vec![
                section(2, "why-islands", "Why islands", "Most of a blog is static text."),
                section(3, "anchors", "Anchors", "Each island owns one empty element."),
                section(3, "configuration", "Configuration", "Options travel in data attributes."),
                section(2, "search", "Search", "A dialog with debounced queries."),
                section(2, "fallbacks", "Fallbacks", "Every link still works without scripts."),
            ],
        },
        Post {
            slug: "last-request-wins".into(),
            title: "Last request wins".into(),
            summary: "Sequence numbers keep slow responses from overwriting fresh ones.".into(),
            tags: vec!["rust".into(), "async".into()],
            sections: vec![
                section(2, "the-race", "The race", "Responses do not arrive in order."),
                section(2, "sequence-numbers", "Sequence numbers", "Tag every request."),
            ],
        },
        Post {
            slug: "partial-page-updates".into(),
            title: "Partial page updates".into(),
            summary: "Swapping one container instead of reloading the page.".into(),
            tags: vec!["web".into(), "htmx".into()],
            sections: vec![
                section(2, "fragments", "Fragments", "The server renders only the list."),
                section(2, "history", "History", "The canonical URL is pushed."),
            ],
        },
    ];
    for n in (1..=9).rev() {
        posts.push(Post {
            slug: format!("weekly-notes-{n}"),
            title: format!("Weekly notes #{n}"),
            summary: format!("Odds and ends from week {n}."),
            tags: vec!["notes".into()],
            sections: vec![section(2, "notes", "Notes", "Short entries.")],
        });
    }
    posts
}

// ---------------------------------------------------------------------------
// Site state
// ---------------------------------------------------------------------------

pub struct Site {
    posts: Vec<Post>,
    search: SearchConfig,
    fragment: FragmentConfig,
}

impl Site {
    pub fn new(posts: Vec<Post>, search: SearchConfig, fragment: FragmentConfig) -> Self {
        Self {
            posts,
            search,
            fragment,
        }
    }

    /// Posts tagged `tag` (all posts for `None`), newest first.
    pub fn filtered(&self, tag: Option<&str>) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt == t)))
            .collect()
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .posts
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// Case-insensitive match on title, summary and tags. Blank queries
    /// match nothing.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.posts
            .iter()
            .filter(|p| p.matches(&needle))
            .map(Post::hit)
            .collect()
    }

    fn post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    fn is_fragment_request(&self, headers: &HeaderMap) -> bool {
        headers
            .get(self.fragment.request_header.as_str())
            .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"))
    }
}

pub fn router(site: Arc<Site>) -> Router {
    let api = site.search.endpoint.clone();
    Router::new()
        .route("/", get(home))
        .route("/blog", get(blog_list))
        .route("/blog/{slug}", get(blog_post))
        .route("/search", get(search_page))
        .route(&api, get(api_search))
        .fallback(not_found)
        .with_state(site)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, site: Arc<Site>) -> anyhow::Result<()> {
    site.search.check_endpoint()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving reference site");
    axum::serve(listener, router(site)).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BlogParams {
    tag: Option<String>,
    #[serde(default)]
    skip: usize,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn home(State(site): State<Arc<Site>>) -> Html<String> {
    let posts = site.filtered(None);
    let mut main = String::from("<h1>Latest posts</h1>");
    post_items(&mut main, posts.iter().take(HOME_SIZE).copied());
    if posts.len() > HOME_SIZE {
        main.push_str(r#"<p><a class="more" href="/blog">All posts</a></p>"#);
    }
    Html(layout("Home", &main))
}

async fn blog_list(
    State(site): State<Arc<Site>>,
    Query(params): Query<BlogParams>,
    headers: HeaderMap,
) -> Response {
    let tag = params.tag.as_deref().filter(|t| !t.is_empty());
    let skip = clamp_skip(site.filtered(tag).len(), params.skip);
    let list = post_list(&site, tag, skip);

    if site.is_fragment_request(&headers) {
        tracing::debug!(?tag, skip, requested = params.skip, "blog fragment");
        let canonical = blog_url(tag, skip);
        let mut response = Html(list).into_response();
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(site.fragment.push_url_header.as_str()),
            HeaderValue::try_from(canonical),
        ) {
            response.headers_mut().insert(name, value);
        }
        return response;
    }

    let mut main = String::from("<h1>Blog</h1>");
    main.push_str(r#"<nav class="tag-list" aria-label="Tags" data-fragment>"#);
    let all_current = if tag.is_none() { r#" aria-current="page""# } else { "" };
    let _ = write!(main, r#"<a href="/blog"{all_current}>All</a>"#);
    for t in site.tags() {
        let current = if tag == Some(t) { r#" aria-current="page""# } else { "" };
        let _ = write!(
            main,
            r#"<a href="{}"{current}>{}</a>"#,
            escape_html(&blog_url(Some(t), 0)),
            escape_html(t)
        );
    }
    main.push_str("</nav>");
    let _ = write!(main, r#"<div id="{}">{list}</div>"#, escape_html(&site.fragment.container_id));
    Html(layout("Blog", &main)).into_response()
}

async fn blog_post(State(site): State<Arc<Site>>, Path(slug): Path<String>) -> Response {
    let Some(post) = site.post(&slug) else {
        return not_found().await;
    };

    let mut main = String::new();
    let _ = write!(
        main,
        r#"<article id="post-content"><h1>{}</h1>"#,
        escape_html(&post.title)
    );
    for s in &post.sections {
        let _ = write!(
            main,
            r#"<h{level} id="{id}">{title}</h{level}><p>{body}</p>"#,
            level = s.level,
            id = escape_html(&s.id),
            title = escape_html(&s.title),
            body = escape_html(&s.body),
        );
    }
    main.push_str("</article>");

    main.push_str(r#"<aside><nav id="toc-nav" aria-label="Table of contents"><ol>"#);
    for s in post.sections.iter().filter(|s| s.level == 2) {
        let _ = write!(
            main,
            r##"<li><a href="#{}">{}</a></li>"##,
            escape_html(&s.id),
            escape_html(&s.title)
        );
    }
    main.push_str(r#"</ol></nav><div id="toc-island"></div></aside>"#);

    main.push_str(r#"<nav class="post-tags" aria-label="Post tags">"#);
    for t in &post.tags {
        let _ = write!(
            main,
            r#"<a href="{}">{}</a>"#,
            escape_html(&blog_url(Some(t), 0)),
            escape_html(t)
        );
    }
    main.push_str("</nav>");

    Html(layout(&post.title, &main)).into_response()
}

async fn search_page(
    State(site): State<Arc<Site>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Html<String> {
    let query = params.q.trim();
    let hits = site.search(query);
    let results = search_results(query, &hits);
    if site.is_fragment_request(&headers) {
        return Html(results);
    }

    let mut main = String::from("<h1>Search</h1>");
    let _ = write!(
        main,
        r#"<form action="/search" method="get" role="search"><label for="q">Search posts</label><input id="q" type="search" name="q" value="{}"><button type="submit">Search</button></form>"#,
        escape_html(query)
    );
    main.push_str(&results);
    Html(layout("Search", &main))
}

async fn api_search(
    State(site): State<Arc<Site>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchPayload> {
    let query = params.q.trim().to_string();
    let results = site.search(&query);
    tracing::debug!(query = %query, hits = results.len(), "api search");
    Json(SearchPayload { query, results })
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(layout(
            "Not found",
            r#"<h1>Page not found</h1><p><a href="/">Back to the home page</a></p>"#,
        )),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

/// `/blog` URL for a tag filter and offset. Unfiltered first page is `/blog`.
pub fn blog_url(tag: Option<&str>, skip: usize) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(tag) = tag {
        query.append_pair("tag", tag);
    }
    if skip > 0 {
        query.append_pair("skip", &skip.to_string());
    }
    let query = query.finish();
    if query.is_empty() {
        "/blog".to_string()
    } else {
        format!("/blog?{query}")
    }
}

/// An offset past the end of `total` posts lands on the last page.
fn clamp_skip(total: usize, skip: usize) -> usize {
    if skip < total {
        skip
    } else {
        total.saturating_sub(1) / PAGE_SIZE * PAGE_SIZE
    }
}

/// Contents of the post-list container: one page of posts plus the link to
/// the next page.
fn post_list(site: &Site, tag: Option<&str>, skip: usize) -> String {
    let posts = site.filtered(tag);
    let mut out = String::new();
    if posts.is_empty() {
        out.push_str(r#"<p class="empty">No posts yet.</p>"#);
        return out;
    }
    let skip = clamp_skip(posts.len(), skip);
    post_items(&mut out, posts.iter().skip(skip).take(PAGE_SIZE).copied());
    let next = skip.saturating_add(PAGE_SIZE);
    if next < posts.len() {
        let _ = write!(
            out,
            r#"<a class="load-more" href="{}">Older posts</a>"#,
            escape_html(&blog_url(tag, next))
        );
    }
    out
}

fn post_items<'a>(out: &mut String, posts: impl Iterator<Item = &'a Post>) {
    out.push_str(r#"<ul class="posts">"#);
    for post in posts {
        let _ = write!(
            out,
            r#"<li><a href="/blog/{}">{}</a><p>{}</p></li>"#,
            escape_html(&post.slug),
            escape_html(&post.title),
            escape_html(&post.summary)
        );
    }
    out.push_str("</ul>");
}

fn search_results(query: &str, hits: &[SearchHit]) -> String {
    let mut out = String::from(r#"<section class="search-results">"#);
    if query.is_empty() {
        out.push_str(r#"<p role="status">Type a query to search posts.</p>"#);
    } else if hits.is_empty() {
        let _ = write!(out, r#"<p role="status">No results for “{}”.</p>"#, escape_html(query));
    } else {
        let _ = write!(out, r#"<p role="status">{} results</p><ul>"#, hits.len());
        for hit in hits {
            let _ = write!(
                out,
                r#"<li><a href="{}">{}</a><p>{}</p></li>"#,
                escape_html(&hit.url),
                escape_html(&hit.title),
                escape_html(&hit.excerpt)
            );
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

fn layout(title: &str, main: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title} · atoll</title></head>
<body>
<a class="skip-link" href="#main">Skip to content</a>
<header>
<nav aria-label="Main navigation"><a href="/">Home</a><a href="/blog">Blog</a><a href="/search" aria-label="Search">Search</a></nav>
<div id="search-island" data-placeholder="Search posts…"></div>
<button type="button" class="theme-toggle" aria-label="Toggle dark mode">◐</button>
</header>
<main id="main">{main}</main>
<footer><nav aria-label="Footer"><a href="/feed.xml">RSS</a></nav></footer>
</body>
</html>
"##,
        title = escape_html(title),
    )
}
