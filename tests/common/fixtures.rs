//! Canned search hits and fragments used across harnesses.

use atoll_core::SearchHit;

/// Origin every builder-made page is loaded from.
pub const ORIGIN: &str = "http://site.test";

pub fn hit(title: &str) -> SearchHit {
    let slug: String = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    SearchHit {
        title: title.to_string(),
        url: format!("/blog/{slug}"),
        excerpt: format!("All about {title}."),
    }
}

/// Hits a scripted source answers with for `query` unless told otherwise.
pub fn hits_for(query: &str) -> Vec<SearchHit> {
    vec![hit(&format!("{query} basics")), hit(&format!("Advanced {query}"))]
}

/// Fragment the fake server returns for the post list filtered by `tag`.
pub fn post_list_fragment(tag: Option<&str>) -> String {
    match tag {
        Some(tag) => format!(r#"<ul class="posts"><li><a href="/blog/{tag}-post">{tag} post</a></li></ul>"#),
        None => r#"<ul class="posts"><li><a href="/blog/first">first</a></li><li><a href="/blog/second">second</a></li></ul>"#.to_string(),
    }
}
