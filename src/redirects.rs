//! Redirect table for the static host.
//!
//! Legacy URLs from the previous site are kept alive with redirects written
//! to a `_redirects` file, one rule per line:
//!
//! ```text
//! /portfolio           /work          301
//! /case-studies/:slug  /work/:slug    301
//! ```
//!
//! `:name` placeholders are passed through untouched; the host expands them.

use crate::config::Redirect;

pub const REDIRECTS_FILENAME: &str = "_redirects";

/// Render the redirect table. Returns `None` when there is nothing to write.
pub fn build_redirects(redirects: &[Redirect]) -> Option<String> {
    if redirects.is_empty() {
        return None;
    }
    let width = redirects.iter().map(|r| r.from.len()).max().unwrap_or(0);
    let mut out = String::new();
    for redirect in redirects {
        let status = if redirect.permanent { 301 } else { 302 };
        out.push_str(&format!(
            "{:<width$}  {}  {}\n",
            redirect.from, redirect.to, status
        ));
    }
    Some(out)
}
