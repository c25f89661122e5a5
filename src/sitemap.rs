//! sitemap.xml and robots.txt generation.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://designgroove.io/</loc>
//!     <changefreq>daily</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//!   <url>
//!     <loc>https://designgroove.io/work/acme</loc>
//!     <lastmod>2024-05-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! One `<url>` per route. The root route is `daily`/`1.0`, everything else
//! `weekly`/`0.8`.

use crate::config::RobotsConfig;
use crate::types::Route;
use std::borrow::Cow;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// File name of the sitemap within the output directory.
pub const SITEMAP_FILENAME: &str = "sitemap.xml";

#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

impl UrlEntry {
    pub fn for_route(site_url: &str, route: &Route) -> Self {
        let (changefreq, priority) = if route.is_root() {
            ("daily", "1.0")
        } else {
            ("weekly", "0.8")
        };
        Self {
            loc: absolute_url(site_url, &route.path),
            lastmod: route.lastmod.clone(),
            changefreq,
            priority,
        }
    }
}

/// `https://site.io/` + `/work` → `https://site.io/work`.
pub fn absolute_url(site_url: &str, path: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), path)
}

/// Build the sitemap document for a route list.
pub fn build_sitemap(site_url: &str, routes: &[Route]) -> String {
    let entries: Vec<UrlEntry> = routes
        .iter()
        .map(|route| UrlEntry::for_route(site_url, route))
        .collect();
    into_xml(&entries)
}

fn into_xml(entries: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 160);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.loc));
        xml.push_str("</loc>\n");
        if let Some(lastmod) = &entry.lastmod {
            xml.push_str("    <lastmod>");
            xml.push_str(&escape_xml(lastmod));
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("    <changefreq>");
        xml.push_str(entry.changefreq);
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(entry.priority);
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

/// Build robots.txt pointing crawlers at the sitemap.
pub fn build_robots(site_url: &str, robots: &RobotsConfig) -> String {
    let mut lines = vec!["User-agent: *".to_string(), "Allow: /".to_string()];
    lines.extend(robots.disallow.iter().map(|p| format!("Disallow: {p}")));
    lines.push(String::new());
    lines.push(format!(
        "Sitemap: {}",
        absolute_url(site_url, &format!("/{SITEMAP_FILENAME}"))
    ));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
