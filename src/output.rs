//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` and a
//! `print_*` wrapper that writes to stdout. Format functions are pure so
//! the exact output can be asserted in tests. Diagnostics go through
//! `tracing` on stderr; this module only renders results.
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 / → index.html
//! 002 /work → work/index.html
//! 003 /work/acme → work/acme/index.html
//!
//! Files
//!     sitemap.xml
//!     404.html
//!     robots.txt
//!     _redirects
//!
//! Content fetch failed, dynamic routes omitted: HTTP error: ...
//! FAILED /broken: component threw
//!
//! Prerendered 3 of 4 routes, 1 failed
//! ```

use crate::pipeline::BuildReport;
use crate::types::{OutputKind, Route, RouteKind};

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the build report.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in report.pages().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.route.as_deref().unwrap_or_default(),
            page.path.display()
        ));
    }

    let others: Vec<_> = report
        .written
        .iter()
        .filter(|f| f.kind != OutputKind::Page)
        .collect();
    if !others.is_empty() {
        lines.push(String::new());
        lines.push("Files".to_string());
        for file in others {
            lines.push(format!("{}{}", indent(1), file.path.display()));
        }
    }

    if report.content_error.is_some() || !report.failed.is_empty() {
        lines.push(String::new());
    }
    if let Some(err) = &report.content_error {
        lines.push(format!(
            "Content fetch failed, dynamic routes omitted: {err}"
        ));
    }
    for failed in &report.failed {
        lines.push(format!("FAILED {}: {}", failed.route, failed.error));
    }

    lines.push(String::new());
    let pages = report.pages().count();
    // +1 for the 404 sentinel
    let attempted = report.routes.len() + 1;
    let rendered = pages + usize::from(has_kind(report, OutputKind::NotFound));
    if report.failed.is_empty() {
        lines.push(format!("Prerendered {rendered} routes"));
    } else {
        lines.push(format!(
            "Prerendered {rendered} of {attempted} routes, {} failed",
            report.failed.len()
        ));
    }
    lines
}

fn has_kind(report: &BuildReport, kind: OutputKind) -> bool {
    report.written.iter().any(|f| f.kind == kind)
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

/// Format the enumerated route list.
pub fn format_routes_output(routes: &[Route]) -> Vec<String> {
    let mut lines = Vec::new();
    for (label, kind) in [("Static", RouteKind::Static), ("Dynamic", RouteKind::Dynamic)] {
        let group: Vec<_> = routes.iter().filter(|r| r.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{label} ({})", group.len()));
        for (i, route) in group.iter().enumerate() {
            match &route.lastmod {
                Some(date) => lines.push(format!(
                    "{} {} (updated {date})",
                    format_index(i + 1),
                    route.path
                )),
                None => lines.push(format!("{} {}", format_index(i + 1), route.path)),
            }
        }
    }
    lines
}

pub fn print_routes_output(routes: &[Route]) {
    for line in format_routes_output(routes) {
        println!("{}", line);
    }
}

/// Format resolved preload URLs.
pub fn format_preloads_output(preloads: &[String]) -> Vec<String> {
    if preloads.is_empty() {
        return vec!["No preload images".to_string()];
    }
    preloads
        .iter()
        .enumerate()
        .map(|(i, url)| format!("{} {}", format_index(i + 1), url))
        .collect()
}

pub fn print_preloads_output(preloads: &[String]) {
    for line in format_preloads_output(preloads) {
        println!("{}", line);
    }
}
