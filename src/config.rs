//! Prerender configuration.
//!
//! Loads `prerender.toml` from the project root. The file is optional and
//! sparse: stock defaults are serialized to a TOML table, the user file is
//! merged on top key-by-key, and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! site_url = "https://designgroove.io"
//! out_dir = "dist"
//!
//! [routes]
//! static = ["/", "/work", "/services", "/process", "/about", "/contact", "/book"]
//! dynamic_prefix = "/work"
//! not_found_path = "/__prerender_not_found__"
//!
//! [template]
//! file = "index.html"           # relative to out_dir
//! head_marker = "<!--app-head-->"
//! body_marker = "<!--app-html-->"
//! css_dir = "assets"            # relative to out_dir
//! stylesheet_pattern = '<link\b[^>]*\bhref="[^"]*/assets/[^"]+\.css"[^>]*>'
//!
//! [cms]
//! project_id = ""
//! dataset = "production"
//! api_version = "2024-01-01"
//! use_cdn = true
//! document_type = "project"
//! timeout_secs = 30
//! # records_file = "content/projects.json"
//!
//! [preload]
//! cdn_base = "https://cdn.sanity.io/images"
//! count = 3
//! width = 800
//! format = "webp"
//! quality = 100
//! default_extension = "jpg"
//!
//! [renderer]
//! command = ["node", "dist/server/render.mjs"]
//!
//! [robots]
//! enabled = true
//! disallow = ["/api/", "/_next/"]
//!
//! [[redirects]]
//! from = "/portfolio"
//! to = "/work"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Arrays (including
//! `redirects`) replace the default wholesale rather than appending.

use crate::routes::is_safe_route;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILENAME: &str = "prerender.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level prerender configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute public URL of the site, used for sitemap and robots.
    pub site_url: String,
    /// Output directory holding the client build and receiving pages.
    pub out_dir: PathBuf,
    pub routes: RoutesConfig,
    pub template: TemplateConfig,
    pub cms: CmsConfig,
    pub preload: PreloadConfig,
    pub renderer: RendererConfig,
    pub robots: RobotsConfig,
    pub redirects: Vec<Redirect>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "https://designgroove.io".to_string(),
            out_dir: PathBuf::from("dist"),
            routes: RoutesConfig::default(),
            template: TemplateConfig::default(),
            cms: CmsConfig::default(),
            preload: PreloadConfig::default(),
            renderer: RendererConfig::default(),
            robots: RobotsConfig::default(),
            redirects: default_redirects(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable before any I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = url::Url::parse(&self.site_url).map_err(|e| {
            ConfigError::Validation(format!("site_url is not a valid URL: {e}"))
        })?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "site_url must be an http(s) URL".into(),
            ));
        }

        if self.routes.r#static.is_empty() {
            return Err(ConfigError::Validation(
                "routes.static must not be empty".into(),
            ));
        }
        if let Some(bad) = self.routes.r#static.iter().find(|r| !r.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "routes.static entry '{bad}' must start with '/'"
            )));
        }
        if let Some(bad) = self.routes.r#static.iter().find(|r| !is_safe_route(r)) {
            return Err(ConfigError::Validation(format!(
                "routes.static entry '{bad}' has an empty, '.', '..' or URL-reserved segment"
            )));
        }
        if !self.routes.dynamic_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "routes.dynamic_prefix must start with '/'".into(),
            ));
        }
        if !is_safe_route(&self.routes.dynamic_prefix) {
            return Err(ConfigError::Validation(
                "routes.dynamic_prefix has an empty, '.', '..' or URL-reserved segment".into(),
            ));
        }
        if !self.routes.not_found_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "routes.not_found_path must start with '/'".into(),
            ));
        }
        if self.routes.r#static.contains(&self.routes.not_found_path) {
            return Err(ConfigError::Validation(
                "routes.not_found_path must not be a real route".into(),
            ));
        }
        if self.routes.sentinel_may_match_record() {
            return Err(ConfigError::Validation(format!(
                "routes.not_found_path must not have the shape of a record route ({}/<slug>)",
                self.routes.dynamic_prefix.trim_end_matches('/')
            )));
        }

        if self.template.head_marker.is_empty() || self.template.body_marker.is_empty() {
            return Err(ConfigError::Validation(
                "template markers must not be empty".into(),
            ));
        }
        if self.template.head_marker == self.template.body_marker {
            return Err(ConfigError::Validation(
                "template.head_marker and template.body_marker must differ".into(),
            ));
        }
        self.template.stylesheet_regex()?;

        if self.preload.quality > 100 {
            return Err(ConfigError::Validation(
                "preload.quality must be 0-100".into(),
            ));
        }
        if self.preload.width == 0 {
            return Err(ConfigError::Validation(
                "preload.width must be non-zero".into(),
            ));
        }
        if self.preload.count == 0 {
            return Err(ConfigError::Validation(
                "preload.count must be non-zero".into(),
            ));
        }

        if self.cms.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "cms.timeout_secs must be non-zero".into(),
            ));
        }
        if let Some(base) = &self.cms.api_base {
            let parsed = url::Url::parse(base).map_err(|e| {
                ConfigError::Validation(format!("cms.api_base is not a valid URL: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(
                    "cms.api_base must be an http(s) URL".into(),
                ));
            }
        }

        if self.renderer.command.is_empty() {
            return Err(ConfigError::Validation(
                "renderer.command must not be empty".into(),
            ));
        }

        if let Some(bad) = self.redirects.iter().find(|r| !r.from.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "redirect source '{}' must start with '/'",
                bad.from
            )));
        }
        Ok(())
    }

    /// Template file location (`<out_dir>/<template.file>`).
    pub fn template_path(&self) -> PathBuf {
        self.out_dir.join(&self.template.file)
    }

    /// Directory scanned for stylesheets to inline.
    pub fn css_dir(&self) -> PathBuf {
        self.out_dir.join(&self.template.css_dir)
    }
}

/// Route seed list and route-shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesConfig {
    /// Static routes, emitted first and in this order.
    pub r#static: Vec<String>,
    /// Prefix for one-per-record dynamic routes (`/work` → `/work/<slug>`).
    pub dynamic_prefix: String,
    /// Sentinel path rendered to produce `404.html`. Must match no real route.
    pub not_found_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            r#static: ["/", "/work", "/services", "/process", "/about", "/contact", "/book"]
                .into_iter()
                .map(String::from)
                .collect(),
            dynamic_prefix: "/work".to_string(),
            not_found_path: "/__prerender_not_found__".to_string(),
        }
    }
}

impl RoutesConfig {
    /// Whether the 404 sentinel could collide with `<dynamic_prefix>/<slug>`
    /// for some record.
    fn sentinel_may_match_record(&self) -> bool {
        let prefix = format!("{}/", self.dynamic_prefix.trim_end_matches('/'));
        self.not_found_path
            .strip_prefix(&prefix)
            .is_some_and(|rest| !rest.contains('/'))
    }
}

/// Page template contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    pub file: PathBuf,
    pub head_marker: String,
    pub body_marker: String,
    pub css_dir: PathBuf,
    /// Regex matching the external stylesheet `<link>` to strip.
    pub stylesheet_pattern: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("index.html"),
            head_marker: "<!--app-head-->".to_string(),
            body_marker: "<!--app-html-->".to_string(),
            css_dir: PathBuf::from("assets"),
            stylesheet_pattern: r#"<link\b[^>]*\bhref="[^"]*/assets/[^"]+\.css"[^>]*>"#
                .to_string(),
        }
    }
}

impl TemplateConfig {
    pub fn stylesheet_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.stylesheet_pattern).map_err(|e| {
            ConfigError::Validation(format!("template.stylesheet_pattern is invalid: {e}"))
        })
    }
}

/// Headless CMS connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Query the edge-cached API host instead of the live one.
    pub use_cdn: bool,
    pub document_type: String,
    pub timeout_secs: u64,
    /// Query API origin; defaults to `https://<project_id>.(api|apicdn).sanity.io`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Read records from a JSON export instead of querying the CMS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_file: Option<PathBuf>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            document_type: "project".to_string(),
            timeout_secs: 30,
            api_base: None,
            records_file: None,
        }
    }
}

/// Homepage image preload settings.
///
/// The defaults target a single mobile viewport. Other breakpoints need
/// their own width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreloadConfig {
    pub cdn_base: String,
    /// Number of leading records considered for preloading.
    pub count: usize,
    pub width: u32,
    pub format: String,
    pub quality: u32,
    /// File extension used when an image identifier carries none.
    pub default_extension: String,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.sanity.io/images".to_string(),
            count: 3,
            width: 800,
            format: "webp".to_string(),
            quality: 100,
            default_extension: "jpg".to_string(),
        }
    }
}

/// External server-render entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Program and leading arguments; the route path is appended.
    pub command: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: vec!["node".to_string(), "dist/server/render.mjs".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotsConfig {
    pub enabled: bool,
    pub disallow: Vec<String>,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disallow: vec!["/api/".to_string(), "/_next/".to_string()],
        }
    }
}

/// A legacy-URL redirect for the static host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    #[serde(default = "default_permanent")]
    pub permanent: bool,
}

fn default_permanent() -> bool {
    true
}

fn default_redirects() -> Vec<Redirect> {
    [
        ("/portfolio", "/work"),
        ("/case-studies/:slug", "/work/:slug"),
        ("/expert-web-development", "/services"),
        ("/services/digital-marketing", "/services"),
        ("/services/web-design", "/services"),
        ("/services/web-development", "/services"),
        ("/services/webflow-design-agency", "/services"),
        ("/solutions/:slug", "/services"),
    ]
    .into_iter()
    .map(|(from, to)| Redirect {
        from: from.to_string(),
        to: to.to_string(),
        permanent: true,
    })
    .collect()
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value; `Ok(None)` when it does not exist.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, falling back to stock defaults when
/// the file is absent.
pub fn load_config_file(file: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(file)?)
}

/// Load `prerender.toml` from the project root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    load_config_file(&root.join(CONFIG_FILENAME))
}

/// Returns a fully-commented stock `prerender.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Prerender Configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys cause an error. Arrays replace the default list wholesale.

# Public origin of the site. Used for sitemap <loc> entries and robots.txt.
site_url = "https://designgroove.io"

# Client build output. Holds the page template and receives the prerendered
# pages, sitemap.xml, 404.html, robots.txt and _redirects.
out_dir = "dist"

# ---------------------------------------------------------------------------
# Routes
# ---------------------------------------------------------------------------
[routes]
# Static pages, rendered first and in this order.
static = ["/", "/work", "/services", "/process", "/about", "/contact", "/book"]

# One page per published CMS record is added at <dynamic_prefix>/<slug>.
dynamic_prefix = "/work"

# Path rendered to produce 404.html. It must not match any real page.
not_found_path = "/__prerender_not_found__"

# ---------------------------------------------------------------------------
# Page template (the client build's index.html)
# ---------------------------------------------------------------------------
[template]
file = "index.html"
head_marker = "<!--app-head-->"
body_marker = "<!--app-html-->"

# Every *.css file in this directory is inlined into a <style> block.
css_dir = "assets"

# The external stylesheet <link> removed from every page.
stylesheet_pattern = '<link\b[^>]*\bhref="[^"]*/assets/[^"]+\.css"[^>]*>'

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[cms]
# Leave empty (or set records_file) to build without the CMS.
project_id = ""
dataset = "production"
api_version = "2024-01-01"
use_cdn = true
document_type = "project"
timeout_secs = 30

# Query a different API origin (a proxy or a local mock) instead of
# https://<project_id>.api(cdn).sanity.io.
# api_base = "http://127.0.0.1:8080"

# Read records from a JSON export instead of querying the CMS.
# records_file = "content/projects.json"

# ---------------------------------------------------------------------------
# Homepage image preloads
# ---------------------------------------------------------------------------
[preload]
cdn_base = "https://cdn.sanity.io/images"

# How many leading records are considered. Records without a usable image
# are skipped, so fewer hints may be emitted.
count = 3

# Tuned for a single mobile viewport.
width = 800
format = "webp"
quality = 100
default_extension = "jpg"

# ---------------------------------------------------------------------------
# Server render entry point
# ---------------------------------------------------------------------------
[renderer]
# The route path is appended as the last argument. The command must print
# {"html": "...", "head": {"title": "...", "meta": "...", "link": "...", "script": "..."}}
command = ["node", "dist/server/render.mjs"]

# ---------------------------------------------------------------------------
# robots.txt
# ---------------------------------------------------------------------------
[robots]
enabled = true
disallow = ["/api/", "/_next/"]

# ---------------------------------------------------------------------------
# Redirects (written to _redirects for the static host)
# ---------------------------------------------------------------------------
[[redirects]]
from = "/portfolio"
to = "/work"
permanent = true

[[redirects]]
from = "/case-studies/:slug"
to = "/work/:slug"
permanent = true

[[redirects]]
from = "/expert-web-development"
to = "/services"
permanent = true

[[redirects]]
from = "/services/digital-marketing"
to = "/services"
permanent = true

[[redirects]]
from = "/services/web-design"
to = "/services"
permanent = true

[[redirects]]
from = "/services/web-development"
to = "/services"
permanent = true

[[redirects]]
from = "/services/webflow-design-agency"
to = "/services"
permanent = true

[[redirects]]
from = "/solutions/:slug"
to = "/services"
permanent = true
"##
}
