//! Page template handling.
//!
//! The client build's `index.html` is the shell every prerendered page is
//! poured into. Its contract:
//!
//! - exactly one head marker (`<!--app-head-->`),
//! - exactly one body marker (`<!--app-html-->`),
//! - at most one external stylesheet `<link>` matching the configured
//!   pattern. It is removed, and the stylesheet contents are inlined
//!   into a `<style>` block instead, saving a round-trip before first paint.
//!
//! The template is validated and split once at load; filling it per route
//! is plain concatenation, so rendered markup that happens to contain a
//! marker string cannot be spliced into twice.

use crate::config::{ConfigError, SiteConfig};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to list stylesheets in {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error(
        "template contains neither {head_marker} nor {body_marker}; it looks like an already \
         prerendered page. Rebuild the client bundle before prerendering again"
    )]
    AlreadyRendered {
        head_marker: String,
        body_marker: String,
    },
    #[error("template must contain {marker} exactly once (found {count})")]
    Marker { marker: String, count: usize },
    #[error("template has {0} stylesheet links matching the pattern, expected at most one")]
    Stylesheets(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A validated page template, pre-split around its two markers.
#[derive(Debug, Clone)]
pub struct Template {
    /// Text before the first marker.
    prefix: String,
    /// Text between the two markers.
    middle: String,
    /// Text after the second marker.
    suffix: String,
    head_first: bool,
    stripped_stylesheet: bool,
}

impl Template {
    /// Validate `source` against the template contract and prepare it for
    /// filling.
    pub fn parse(
        source: &str,
        head_marker: &str,
        body_marker: &str,
        stylesheet: &Regex,
    ) -> Result<Self, TemplateError> {
        let links = stylesheet.find_iter(source).count();
        if links > 1 {
            return Err(TemplateError::Stylesheets(links));
        }
        if links == 0 {
            warn!("template has no external stylesheet link to strip");
        }
        let source = stylesheet.replace(source, "");

        if !source.contains(head_marker) && !source.contains(body_marker) {
            return Err(TemplateError::AlreadyRendered {
                head_marker: head_marker.to_string(),
                body_marker: body_marker.to_string(),
            });
        }
        let head_at = single_marker(&source, head_marker)?;
        let body_at = single_marker(&source, body_marker)?;

        let head_first = head_at < body_at;
        let (first, first_len, second, second_len) = if head_first {
            (head_at, head_marker.len(), body_at, body_marker.len())
        } else {
            (body_at, body_marker.len(), head_at, head_marker.len())
        };

        Ok(Self {
            prefix: source[..first].to_string(),
            middle: source[first + first_len..second].to_string(),
            suffix: source[second + second_len..].to_string(),
            head_first,
            stripped_stylesheet: links == 1,
        })
    }

    /// Load `<out_dir>/<template.file>` using the configured markers and
    /// stylesheet pattern.
    pub fn load(config: &SiteConfig) -> Result<Self, TemplateError> {
        let path = config.template_path();
        let source = read(&path)?;
        let stylesheet = config.template.stylesheet_regex()?;
        Self::parse(
            &source,
            &config.template.head_marker,
            &config.template.body_marker,
            &stylesheet,
        )
    }

    /// Whether loading removed an external stylesheet link.
    pub fn stripped_stylesheet(&self) -> bool {
        self.stripped_stylesheet
    }

    /// Produce a full page with `head` and `body` in place of the markers.
    pub fn fill(&self, head: &str, body: &str) -> String {
        let (first, second) = if self.head_first {
            (head, body)
        } else {
            (body, head)
        };
        let mut page = String::with_capacity(
            self.prefix.len() + self.middle.len() + self.suffix.len() + head.len() + body.len(),
        );
        page.push_str(&self.prefix);
        page.push_str(first);
        page.push_str(&self.middle);
        page.push_str(second);
        page.push_str(&self.suffix);
        page
    }
}

fn single_marker(source: &str, marker: &str) -> Result<usize, TemplateError> {
    let count = source.matches(marker).count();
    match (count, source.find(marker)) {
        (1, Some(at)) => Ok(at),
        _ => Err(TemplateError::Marker {
            marker: marker.to_string(),
            count,
        }),
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Concatenate every `*.css` file directly inside `dir`, in file-name order.
///
/// A missing directory yields an empty stylesheet.
pub fn load_css(dir: &Path) -> Result<String, TemplateError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "stylesheet directory not found, inlining empty CSS");
        return Ok(String::new());
    }

    let mut sheets = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| TemplateError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let is_css = entry.path().extension().is_some_and(|ext| ext == "css");
        if entry.file_type().is_file() && is_css {
            debug!(file = %entry.path().display(), "inlining stylesheet");
            sheets.push(read(entry.path())?);
        }
    }
    Ok(sheets.join("\n"))
}
