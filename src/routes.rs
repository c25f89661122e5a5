//! Route enumeration.
//!
//! Produces the ordered list of paths to prerender: the configured static
//! routes first, then one dynamic route per published content record, in
//! the order the content store returned them.
//!
//! A failed content fetch is not fatal. It is logged and the run continues
//! with the static routes only, so a CMS outage still yields a deployable
//! (if incomplete) site.

use crate::config::RoutesConfig;
use crate::content::{ContentError, ContentRepository};
use crate::types::{ContentRecord, Route};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Outcome of route enumeration.
#[derive(Debug)]
pub struct Enumeration {
    pub routes: Vec<Route>,
    /// Records as fetched, reused by the asset resolver.
    pub records: Vec<ContentRecord>,
    /// Set when the content fetch failed and dynamic routes were omitted.
    pub fetch_error: Option<ContentError>,
}

/// Fetch content and build the complete route list.
pub fn enumerate(config: &RoutesConfig, repo: &dyn ContentRepository) -> Enumeration {
    match repo.list_published() {
        Ok(records) => {
            debug!(records = records.len(), "fetched content records");
            Enumeration {
                routes: build_routes(config, &records),
                records,
                fetch_error: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "content fetch failed, prerendering static routes only");
            Enumeration {
                routes: build_routes(config, &[]),
                records: Vec::new(),
                fetch_error: Some(err),
            }
        }
    }
}

/// Static routes followed by one route per record with a usable slug.
///
/// Records without a slug are skipped. Unsafe slugs and slugs whose path
/// is already taken are skipped with a warning, so every route is unique.
pub fn build_routes(config: &RoutesConfig, records: &[ContentRecord]) -> Vec<Route> {
    let mut seen = HashSet::new();
    let mut routes = Vec::with_capacity(config.r#static.len() + records.len());

    for path in &config.r#static {
        if seen.insert(path.clone()) {
            routes.push(Route::new_static(path.clone()));
        }
    }

    for record in records {
        let Some(slug) = record.slug() else {
            continue;
        };
        if !is_safe_segment(slug) {
            warn!(slug, "skipping record with unsafe slug");
            continue;
        }
        let path = dynamic_path(&config.dynamic_prefix, slug);
        if !seen.insert(path.clone()) {
            warn!(route = %path, "skipping duplicate route");
            continue;
        }
        let lastmod = record.updated_at.as_deref().and_then(date_part);
        routes.push(Route::new_dynamic(path, lastmod));
    }

    routes
}

/// `/work` + `acme` → `/work/acme`.
pub fn dynamic_path(prefix: &str, slug: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), slug)
}

/// Whether `segment` can serve both as one directory name under the
/// output root and as one URL path segment without encoding.
///
/// Rejects empty, `.` and `..`, separators, URL delimiters (`?`, `#`, `%`),
/// whitespace and control characters.
pub fn is_safe_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
        && !segment.chars().any(|c| {
            matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
        })
}

/// Whether a configured route (`/`, `/work`, `/work/featured/`) maps to a
/// path inside the output directory and to the same URL it is served at.
pub fn is_safe_route(route: &str) -> bool {
    let Some(rest) = route.strip_prefix('/') else {
        return false;
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    rest.is_empty() || rest.split('/').all(is_safe_segment)
}

/// `2024-05-01T10:00:00Z` → `2024-05-01`.
fn date_part(timestamp: &str) -> Option<String> {
    let date = timestamp.get(..10)?;
    let bytes = date.as_bytes();
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    shape_ok.then(|| date.to_string())
}
