//! Configuration types for atoll.
//!
//! [`Config::load`] reads `~/.config/atoll/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
anchor_id   = "search-island"
endpoint    = "/api/search"
query_param = "q"
debounce_ms = 250
shortcut    = "/"

[toc]
anchor_id        = "toc-island"
region_id        = "post-content"
min_level        = 2
max_level        = 3
active_offset_px = 80

[fragment]
container_id    = "post-list"
marker_attr     = "data-fragment"
request_header  = "HX-Request"
push_url_header = "HX-Push-Url"

[site]
addr     = "127.0.0.1:8000"
base_url = "http://127.0.0.1:8000"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/atoll/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub toc: TocConfig,
    #[serde(default)]
    pub fragment: FragmentConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_anchor")]
    pub anchor_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Single character that opens the dialog outside editable controls.
    #[serde(default = "default_shortcut")]
    pub shortcut: String,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The shortcut as a key. Falls back to `/` for values that are not a
    /// single character; [`Config::load_from`] rejects those up front.
    pub fn shortcut_key(&self) -> char {
        let mut chars = self.shortcut.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => c,
            _ => '/',
        }
    }
}

/// Paths the reference site serves pages on; the search endpoint must not
/// shadow them.
const SITE_PAGES: &[&str] = &["/", "/blog", "/search"];

impl SearchConfig {
    /// The endpoint must be an absolute path that routes cleanly next to
    /// the site's own pages.
    pub fn check_endpoint(&self) -> anyhow::Result<()> {
        let endpoint = self.endpoint.as_str();
        if !endpoint.starts_with('/') {
            anyhow::bail!("search.endpoint must start with '/' (got {endpoint:?})");
        }
        if endpoint
            .chars()
            .any(|c| matches!(c, '?' | '#' | '{' | '}' | '*') || c.is_whitespace())
        {
            anyhow::bail!("search.endpoint must be a plain path (got {endpoint:?})");
        }
        let trimmed = endpoint.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        if SITE_PAGES.contains(&trimmed) || trimmed.starts_with("/blog/") {
            anyhow::bail!("search.endpoint {endpoint:?} collides with a site page");
        }
        Ok(())
    }
}

fn default_search_anchor() -> String { "search-island".to_string() }
fn default_endpoint() -> String { "/api/search".to_string() }
fn default_query_param() -> String { "q".to_string() }
fn default_debounce_ms() -> u64 { 250 }
fn default_shortcut() -> String { "/".to_string() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            anchor_id: default_search_anchor(),
            endpoint: default_endpoint(),
            query_param: default_query_param(),
            debounce_ms: default_debounce_ms(),
            shortcut: default_shortcut(),
        }
    }
}

/// `[toc]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TocConfig {
    #[serde(default = "default_toc_anchor")]
    pub anchor_id: String,
    /// Id of the element whose headings are listed.
    #[serde(default = "default_region_id")]
    pub region_id: String,
    #[serde(default = "default_min_level")]
    pub min_level: u8,
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    /// A heading becomes active once its top is within this many pixels of
    /// the viewport top.
    #[serde(default = "default_active_offset")]
    pub active_offset_px: i32,
}

fn default_toc_anchor() -> String { "toc-island".to_string() }
fn default_region_id() -> String { "post-content".to_string() }
fn default_min_level() -> u8 { 2 }
fn default_max_level() -> u8 { 3 }
fn default_active_offset() -> i32 { 80 }

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            anchor_id: default_toc_anchor(),
            region_id: default_region_id(),
            min_level: default_min_level(),
            max_level: default_max_level(),
            active_offset_px: default_active_offset(),
        }
    }
}

/// `[fragment]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentConfig {
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Attribute marking a link (or an ancestor of it) as fragment-enhanced.
    #[serde(default = "default_marker_attr")]
    pub marker_attr: String,
    #[serde(default = "default_request_header")]
    pub request_header: String,
    #[serde(default = "default_push_url_header")]
    pub push_url_header: String,
}

fn default_container_id() -> String { "post-list".to_string() }
fn default_marker_attr() -> String { "data-fragment".to_string() }
fn default_request_header() -> String { "HX-Request".to_string() }
fn default_push_url_header() -> String { "HX-Push-Url".to_string() }

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            marker_attr: default_marker_attr(),
            request_header: default_request_header(),
            push_url_header: default_push_url_header(),
        }
    }
}

/// `[site]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Listen address of `atoll serve`.
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Origin the HTTP transports resolve relative URLs against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_addr() -> String { "127.0.0.1:8000".to_string() }
fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_url: default_base_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/atoll/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file on top of the built-in defaults. A missing file
    /// yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(1..=6).contains(&self.toc.min_level)
            || !(1..=6).contains(&self.toc.max_level)
            || self.toc.min_level > self.toc.max_level
        {
            anyhow::bail!(
                "toc levels must satisfy 1 <= min_level <= max_level <= 6 (got {}..={})",
                self.toc.min_level,
                self.toc.max_level
            );
        }
        self.search.check_endpoint()?;
        let mut chars = self.search.shortcut.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => {}
            _ => anyhow::bail!(
                "search.shortcut must be a single printable character (got {:?})",
                self.search.shortcut
            ),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("atoll")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.search.anchor_id, "search-island");
        assert_eq!(cfg.search.shortcut_key(), '/');
        assert_eq!(cfg.search.debounce(), Duration::from_millis(250));
        assert_eq!(cfg.toc.min_level, 2);
        assert_eq!(cfg.fragment.request_header, "HX-Request");
    }

    #[test]
    fn file_overrides_layer_on_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = 300\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.search.debounce_ms, 300);
        assert_eq!(cfg.search.endpoint, "/api/search");
        assert_eq!(cfg.toc.region_id, "post-content");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.fragment.container_id, "post-list");
    }

    #[test]
    fn multi_char_shortcut_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nshortcut = \"ctrl+k\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn endpoint_colliding_with_a_page_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        for endpoint in ["/search", "/blog/", "/", "/blog/{slug}", "api/search", "/api?q="] {
            std::fs::write(&path, format!("[search]\nendpoint = {endpoint:?}\n")).unwrap();
            let err = Config::load_from(&path).unwrap_err();
            assert!(err.to_string().contains("search.endpoint"), "{endpoint}: {err}");
        }
    }

    #[test]
    fn custom_endpoint_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nendpoint = \"/search.json\"\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().search.endpoint, "/search.json");
    }

    #[test]
    fn inverted_toc_levels_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[toc]\nmin_level = 4\nmax_level = 2\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
