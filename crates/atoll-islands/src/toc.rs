//! Table-of-contents island.
//!
//! Lists the headings of the content region as a nested `<ol>` inside
//! `nav[aria-label="On this page"]` and highlights the heading the reader is
//! currently in. No network access. If the island fails to mount, the static
//! server-rendered `#toc-nav` is left as it was.

use crate::bootstrap::IslandConfig;
use atoll_core::config::TocConfig;
use atoll_core::dom::{Document, NodeId};
use atoll_core::{DomError, TocEntry};
use regex::Regex;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Anchor slug for a heading: lowercase ASCII, every run of other characters
/// collapsed to a single `-`, no leading or trailing hyphen.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    non_alnum()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Collect the headings of `region` within `levels`, in document order.
///
/// Headings without an `id` receive a unique slug id so the links resolve.
/// Existing ids are kept and reserved.
pub fn scan(
    doc: &mut Document,
    region: NodeId,
    levels: RangeInclusive<u8>,
) -> Result<Vec<TocEntry>, DomError> {
    let headings: Vec<(NodeId, u8)> = doc
        .elements_by_tag(region, &HEADING_TAGS)
        .into_iter()
        .filter_map(|n| doc.tag(n).and_then(heading_level).map(|l| (n, l)))
        .filter(|(_, level)| levels.contains(level))
        .collect();

    let mut taken: HashSet<String> = doc
        .descendants(doc.root())
        .into_iter()
        .filter_map(|n| doc.attr(n, "id").map(str::to_string))
        .collect();

    let mut entries = Vec::with_capacity(headings.len());
    for (node, level) in headings {
        let text = doc.text_content(node).trim().to_string();
        let heading_id = match doc.attr(node, "id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = unique_slug(&text, &mut taken);
                doc.set_attr(node, "id", &id)?;
                id
            }
        };
        entries.push(TocEntry {
            heading_id,
            text,
            level,
        });
    }
    Ok(entries)
}

fn unique_slug(text: &str, taken: &mut HashSet<String>) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base = "section".to_string();
    }
    let mut candidate = base.clone();
    let mut n = 1;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

// ---------------------------------------------------------------------------
// Island
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
    /// One link per entry, same order.
    links: Vec<NodeId>,
    nav: Option<NodeId>,
    active: Option<usize>,
    offset: i32,
}

impl TableOfContents {
    /// Scan the region (`data-region` on the anchor, else the configured
    /// id) and render the list under `anchor`. A page whose region has no
    /// matching headings mounts with nothing rendered.
    pub fn mount(
        doc: &mut Document,
        anchor: NodeId,
        config: &IslandConfig,
        settings: &TocConfig,
    ) -> anyhow::Result<Self> {
        let region_id = config
            .get("region")
            .map(String::as_str)
            .unwrap_or(&settings.region_id);
        let region = doc
            .get_element_by_id(region_id)
            .ok_or_else(|| anyhow::anyhow!("content region #{region_id} not found"))?;

        let entries = scan(doc, region, settings.min_level..=settings.max_level)?;
        let mut toc = Self {
            entries,
            links: Vec::new(),
            nav: None,
            active: None,
            offset: settings.active_offset_px,
        };
        if toc.entries.is_empty() {
            tracing::debug!(region = region_id, "toc: no headings");
            return Ok(toc);
        }

        let nav = doc.append_element(
            anchor,
            "nav",
            &[("class", "toc"), ("aria-label", "On this page")],
        )?;
        toc.links = render_list(doc, nav, &toc.entries)?;
        toc.nav = Some(nav);
        toc.set_active(doc, Some(0))?;
        tracing::debug!(region = region_id, headings = toc.entries.len(), "toc mounted");
        Ok(toc)
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn nav(&self) -> Option<NodeId> {
        self.nav
    }

    pub fn active(&self) -> Option<&TocEntry> {
        self.active.and_then(|i| self.entries.get(i))
    }

    /// Update the active heading from viewport offsets (`id`, top in px).
    /// Headings missing from `tops` are ignored. Returns `true` if the
    /// active heading changed.
    pub fn track(&mut self, doc: &mut Document, tops: &[(String, i32)]) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let passed = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                tops.iter()
                    .any(|(id, top)| *id == e.heading_id && *top <= self.offset)
            })
            .map(|(i, _)| i)
            .last();
        let next = Some(passed.unwrap_or(0));
        if next == self.active {
            return false;
        }
        if let Err(err) = self.set_active(doc, next) {
            tracing::warn!(error = %err, "toc: could not mark active heading");
            return false;
        }
        tracing::debug!(active = ?self.active().map(|e| &e.heading_id), "toc: active heading");
        true
    }

    fn set_active(&mut self, doc: &mut Document, next: Option<usize>) -> Result<(), DomError> {
        if let Some(link) = self.active.and_then(|i| self.links.get(i)) {
            doc.remove_attr(*link, "aria-current")?;
        }
        if let Some(link) = next.and_then(|i| self.links.get(i)) {
            doc.set_attr(*link, "aria-current", "location")?;
        }
        self.active = next;
        Ok(())
    }
}

/// Render `entries` as nested ordered lists. A deeper heading opens a list
/// inside the previous item; a shallower one closes lists until its level.
fn render_list(
    doc: &mut Document,
    nav: NodeId,
    entries: &[TocEntry],
) -> Result<Vec<NodeId>, DomError> {
    let base = entries.iter().map(|e| e.level).min().unwrap_or(1);
    let root = doc.append_element(nav, "ol", &[("class", "toc-list")])?;

    // (level, list, last item in that list)
    let mut stack: Vec<(u8, NodeId, Option<NodeId>)> = vec![(base, root, None)];
    let mut links = Vec::with_capacity(entries.len());

    for entry in entries {
        while stack.len() > 1 && stack.last().is_some_and(|(level, _, _)| entry.level < *level) {
            stack.pop();
        }
        let Some(&(level, list, last)) = stack.last() else {
            break;
        };
        let list = if entry.level > level {
            let holder = match last {
                Some(li) => li,
                None => doc.append_element(list, "li", &[])?,
            };
            let nested = doc.append_element(holder, "ol", &[])?;
            stack.push((entry.level, nested, None));
            nested
        } else {
            list
        };

        let li = doc.append_element(list, "li", &[])?;
        let href = format!("#{}", entry.heading_id);
        let a = doc.append_element(li, "a", &[("href", &href)])?;
        doc.append_text(a, entry.text.clone())?;
        if let Some(top) = stack.last_mut() {
            top.2 = Some(li);
        }
        links.push(a);
    }
    Ok(links)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Hello, World!", "hello-world")]
    #[case("  Ownership & Borrowing  ", "ownership-borrowing")]
    #[case("Rust 2024 edition", "rust-2024-edition")]
    #[case("---", "")]
    #[case("Why `async`?", "why-async")]
    fn slugify_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    fn article(headings: &[(&str, &str, Option<&str>)]) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let body = doc.append_element(root, "body", &[]).unwrap();
        let anchor = doc
            .append_element(body, "div", &[("id", "toc-island")])
            .unwrap();
        let region = doc
            .append_element(body, "article", &[("id", "post-content")])
            .unwrap();
        for (tag, text, id) in headings {
            let attrs: Vec<(&str, &str)> = id.iter().map(|id| ("id", *id)).collect();
            let h = doc.append_element(region, tag, &attrs).unwrap();
            doc.append_text(h, *text).unwrap();
            let p = doc.append_element(region, "p", &[]).unwrap();
            doc.append_text(p, "body text").unwrap();
        }
        (doc, anchor, region)
    }

    #[test]
    fn scan_filters_levels_and_assigns_unique_ids() {
        let (mut doc, _, region) = article(&[
            ("h1", "Title", None),
            ("h2", "Setup", None),
            ("h3", "Setup", None),
            ("h2", "!!!", None),
            ("h4", "Deep", None),
            ("h2", "Kept", Some("custom")),
        ]);
        let entries = scan(&mut doc, region, 2..=3).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.heading_id.as_str()).collect();
        assert_eq!(ids, ["setup", "setup-1", "section", "custom"]);
        assert_eq!(entries[1].level, 3);
        assert_eq!(doc.get_element_by_id("setup-1").map(|n| doc.tag(n)), Some(Some("h3")));
    }

    #[test]
    fn scan_avoids_ids_already_on_the_page() {
        let (mut doc, _, region) = article(&[("h2", "Intro", None)]);
        let root = doc.root();
        doc.append_element(root, "div", &[("id", "intro")]).unwrap();
        let entries = scan(&mut doc, region, 2..=3).unwrap();
        assert_eq!(entries[0].heading_id, "intro-1");
    }

    #[test]
    fn renders_nested_list() {
        let (mut doc, anchor, _) = article(&[
            ("h2", "Install", None),
            ("h3", "From source", None),
            ("h3", "From crates.io", None),
            ("h2", "Usage", None),
        ]);
        let toc = TableOfContents::mount(
            &mut doc,
            anchor,
            &IslandConfig::new(),
            &TocConfig::default(),
        )
        .unwrap();
        insta::assert_snapshot!(doc.inner_html(anchor), @r###"<nav aria-label="On this page" class="toc"><ol class="toc-list"><li><a aria-current="location" href="#install">Install</a><ol><li><a href="#from-source">From source</a></li><li><a href="#from-crates-io">From crates.io</a></li></ol></li><li><a href="#usage">Usage</a></li></ol></nav>"###);
        assert_eq!(toc.active().map(|e| e.heading_id.as_str()), Some("install"));
    }

    #[test]
    fn region_override_and_missing_region() {
        let (mut doc, anchor, _) = article(&[("h2", "Install", None)]);
        let config = IslandConfig::from([("region".to_string(), "nowhere".to_string())]);
        let err = TableOfContents::mount(&mut doc, anchor, &config, &TocConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("#nowhere"));
    }

    #[test]
    fn no_headings_renders_nothing() {
        let (mut doc, anchor, _) = article(&[("h4", "Too deep", None)]);
        let toc = TableOfContents::mount(
            &mut doc,
            anchor,
            &IslandConfig::new(),
            &TocConfig::default(),
        )
        .unwrap();
        assert!(toc.entries().is_empty());
        assert!(toc.nav().is_none());
        assert!(doc.children(anchor).is_empty());
    }

    #[test]
    fn tracking_follows_the_last_passed_heading() {
        let (mut doc, anchor, _) = article(&[
            ("h2", "One", None),
            ("h2", "Two", None),
            ("h2", "Three", None),
        ]);
        let mut toc = TableOfContents::mount(
            &mut doc,
            anchor,
            &IslandConfig::new(),
            &TocConfig::default(),
        )
        .unwrap();
        let tops = |a: i32, b: i32, c: i32| {
            vec![("one".to_string(), a), ("two".to_string(), b), ("three".to_string(), c)]
        };

        assert!(!toc.track(&mut doc, &tops(200, 600, 1000)), "first stays active");
        assert!(toc.track(&mut doc, &tops(-400, 40, 500)));
        assert_eq!(toc.active().map(|e| e.text.as_str()), Some("Two"));

        let links: Vec<_> = doc.elements_by_tag(anchor, &["a"]);
        let current: Vec<_> = links
            .iter()
            .filter(|&&a| doc.attr(a, "aria-current") == Some("location"))
            .collect();
        assert_eq!(current, [&links[1]]);

        assert!(toc.track(&mut doc, &tops(-900, -500, 80)));
        assert_eq!(toc.active().map(|e| e.text.as_str()), Some("Three"));
        assert!(toc.track(&mut doc, &tops(300, 700, 1100)));
        assert_eq!(toc.active().map(|e| e.text.as_str()), Some("One"));
    }
}
