//! Test builders: documents shaped like the reference site's pages, and
//! shorthand constructors for DOM events.
//!
//! Builders panic on invalid input rather than returning `Result`.

use super::fixtures::ORIGIN;
use atoll_core::config::Config;
use atoll_core::dom::{Document, NodeId};
use atoll_islands::event::{DomEvent, Key, Modifiers, MouseButton};
use atoll_islands::Page;
use url::Url;

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN)
        .and_then(|base| base.join(path))
        .expect("test url")
}

// ---------------------------------------------------------------------------
// PageBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for a booted [`Page`].
///
/// ```rust,ignore
/// let (page, ids) = PageBuilder::blog()
///     .search_anchor(&[("placeholder", "Find")])
///     .tags(&["rust", "web"])
///     .build();
/// ```
pub struct PageBuilder {
    path: String,
    config: Config,
    search_anchor: Option<Vec<(String, String)>>,
    toc_anchor: Option<Vec<(String, String)>>,
    tags: Option<Vec<String>>,
    container: bool,
    headings: Vec<(u8, String)>,
    textarea: bool,
}

/// Nodes of interest on a built page.
#[derive(Debug)]
pub struct PageIds {
    pub all_tag: Option<NodeId>,
    pub tags: Vec<(String, NodeId)>,
    pub container: Option<NodeId>,
    pub static_toc: Option<NodeId>,
    pub textarea: Option<NodeId>,
    /// A plain, unmarked link to a post.
    pub post_link: NodeId,
}

impl PageIds {
    pub fn tag(&self, name: &str) -> NodeId {
        self.tags
            .iter()
            .find(|(t, _)| t == name)
            .map(|(_, n)| *n)
            .unwrap_or_else(|| panic!("no tag link {name:?}"))
    }

    pub fn all(&self) -> NodeId {
        self.all_tag.expect("page has no tag list")
    }
}

impl PageBuilder {
    /// A bare page at `/`: header, main, nothing interactive.
    pub fn new() -> Self {
        Self {
            path: "/".to_string(),
            config: Config::defaults(),
            search_anchor: None,
            toc_anchor: None,
            tags: None,
            container: false,
            headings: Vec::new(),
            textarea: false,
        }
    }

    /// `/blog` with the search anchor, a tag list and the post-list container.
    pub fn blog() -> Self {
        Self::new()
            .path("/blog")
            .search_anchor(&[])
            .tags(&["rust", "web"])
    }

    /// A post page with the search and ToC anchors and a few headings.
    pub fn post() -> Self {
        Self::new()
            .path("/blog/islands")
            .search_anchor(&[])
            .toc_anchor(&[])
            .heading(2, "Why islands")
            .heading(3, "Anchors")
            .heading(2, "Search")
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn search_anchor(mut self, data: &[(&str, &str)]) -> Self {
        self.search_anchor = Some(owned(data));
        self
    }

    pub fn toc_anchor(mut self, data: &[(&str, &str)]) -> Self {
        self.toc_anchor = Some(owned(data));
        self
    }

    /// Tag list marked for fragment navigation, plus the container it
    /// updates.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self.container = true;
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    pub fn heading(mut self, level: u8, text: &str) -> Self {
        self.headings.push((level, text.to_string()));
        self
    }

    pub fn textarea(mut self) -> Self {
        self.textarea = true;
        self
    }

    /// The server-rendered document, before any island mounts.
    pub fn document(&self) -> (Document, PageIds) {
        let mut doc = Document::new();
        let root = doc.root();
        let html = el(&mut doc, root, "html", &[("lang", "en")]);
        let body = el(&mut doc, html, "body", &[]);
        let skip = el(&mut doc, body, "a", &[("class", "skip-link"), ("href", "#main")]);
        doc.append_text(skip, "Skip to content").expect("text");

        let header = el(&mut doc, body, "header", &[]);
        let nav = el(&mut doc, header, "nav", &[("aria-label", "Main navigation")]);
        el(&mut doc, nav, "a", &[("href", "/blog")]);
        el(&mut doc, nav, "a", &[("href", "/search"), ("aria-label", "Search")]);
        if let Some(data) = &self.search_anchor {
            anchor(&mut doc, header, "search-island", data);
        }

        let main = el(&mut doc, body, "main", &[("id", "main")]);
        let post_link = el(&mut doc, main, "a", &[("href", "/blog/hello")]);
        let mut ids = PageIds {
            all_tag: None,
            tags: Vec::new(),
            container: None,
            static_toc: None,
            textarea: None,
            post_link,
        };

        if let Some(tags) = &self.tags {
            let list = el(
                &mut doc,
                main,
                "nav",
                &[("class", "tag-list"), ("aria-label", "Tags"), ("data-fragment", "")],
            );
            ids.all_tag = Some(el(&mut doc, list, "a", &[("href", "/blog")]));
            for tag in tags {
                let href = format!("/blog?tag={tag}");
                let link = el(&mut doc, list, "a", &[("href", &href)]);
                doc.append_text(link, tag.clone()).expect("text");
                ids.tags.push((tag.clone(), link));
            }
        }
        if self.container {
            let container = el(&mut doc, main, "div", &[("id", "post-list")]);
            doc.append_text(container, "server-rendered posts").expect("text");
            ids.container = Some(container);
        }

        if !self.headings.is_empty() {
            let article = el(&mut doc, main, "article", &[("id", "post-content")]);
            for (level, text) in &self.headings {
                let h = el(&mut doc, article, &format!("h{level}"), &[]);
                doc.append_text(h, text.clone()).expect("text");
                let p = el(&mut doc, article, "p", &[]);
                doc.append_text(p, "Body text.").expect("text");
            }
            let aside = el(&mut doc, main, "aside", &[]);
            let toc_nav = el(
                &mut doc,
                aside,
                "nav",
                &[("id", "toc-nav"), ("aria-label", "Table of contents")],
            );
            doc.append_text(toc_nav, "static toc").expect("text");
            ids.static_toc = Some(toc_nav);
            if let Some(data) = &self.toc_anchor {
                anchor(&mut doc, aside, "toc-island", data);
            }
        }

        if self.textarea {
            ids.textarea = Some(el(&mut doc, main, "textarea", &[("name", "comment")]));
        }
        (doc, ids)
    }

    pub fn build(self) -> (Page, PageIds) {
        let (doc, ids) = self.document();
        let page = Page::boot(doc, url(&self.path), self.config);
        (page, ids)
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn owned(data: &[(&str, &str)]) -> Vec<(String, String)> {
    data.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    doc.append_element(parent, tag, attrs).expect("append element")
}

fn anchor(doc: &mut Document, parent: NodeId, id: &str, data: &[(String, String)]) -> NodeId {
    let node = el(doc, parent, "div", &[("id", id)]);
    for (key, value) in data {
        doc.set_attr(node, &format!("data-{key}"), value)
            .expect("data attribute");
    }
    node
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub fn press(c: char) -> DomEvent {
    DomEvent::KeyDown {
        key: Key::Char(c),
        modifiers: Modifiers::NONE,
    }
}

pub fn escape() -> DomEvent {
    DomEvent::KeyDown {
        key: Key::Escape,
        modifiers: Modifiers::NONE,
    }
}

pub fn enter() -> DomEvent {
    DomEvent::KeyDown {
        key: Key::Enter,
        modifiers: Modifiers::NONE,
    }
}

pub fn click(target: NodeId) -> DomEvent {
    DomEvent::Click {
        target,
        button: MouseButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

pub fn ctrl_click(target: NodeId) -> DomEvent {
    DomEvent::Click {
        target,
        button: MouseButton::Primary,
        modifiers: Modifiers::CTRL,
    }
}

pub fn input(target: NodeId, value: &str) -> DomEvent {
    DomEvent::Input {
        target,
        value: value.to_string(),
    }
}
