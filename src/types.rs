//! Shared types passed between pipeline stages.
//!
//! Everything here lives for one generation run. Content records are read
//! from the CMS (or a JSON export) and never mutated; render results are
//! produced and consumed inside a single loop iteration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteKind {
    /// Fixed top-level page from the configured seed list.
    Static,
    /// One page per published content record, derived from its slug.
    Dynamic,
}

/// A single site path to prerender, e.g. `/work/my-project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    pub kind: RouteKind,
    /// Last modification date (`YYYY-MM-DD`) for dynamic routes whose
    /// record carries `_updatedAt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
}

impl Route {
    pub fn new_static(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: RouteKind::Static,
            lastmod: None,
        }
    }

    pub fn new_dynamic(path: impl Into<String>, lastmod: Option<String>) -> Self {
        Self {
            path: path.into(),
            kind: RouteKind::Dynamic,
            lastmod,
        }
    }

    /// True for the landing route (`/`).
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }
}

/// Sanity-style slug object: `{ "current": "my-project" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default)]
    pub current: Option<String>,
}

/// A published content record as returned by the content store.
///
/// Only the fields the pipeline consumes are modelled; anything else in
/// the CMS document is ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(rename = "heroImageId", default)]
    pub hero_image_id: Option<String>,
    #[serde(rename = "imageId", default)]
    pub image_id: Option<String>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<String>,
}

impl ContentRecord {
    /// The trimmed slug, or `None` when missing or blank.
    pub fn slug(&self) -> Option<&str> {
        self.slug
            .as_ref()
            .and_then(|s| s.current.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Preferred image identifier: the hero image, falling back to the
    /// generic image field.
    pub fn preferred_image_id(&self) -> Option<&str> {
        self.hero_image_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.image_id.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Head-tag fragments produced by the renderer, each already serialized
/// to raw markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeadTags {
    pub title: String,
    pub meta: String,
    pub link: String,
    pub script: String,
}

/// Output of rendering one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderResult {
    pub html: String,
    #[serde(default)]
    pub head: HeadTags,
}

/// Kind of artifact written to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Page,
    NotFound,
    Sitemap,
    Robots,
    Redirects,
}

/// A file written during the run, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub kind: OutputKind,
    /// Route the file was rendered from (pages only).
    pub route: Option<String>,
    pub path: PathBuf,
}
