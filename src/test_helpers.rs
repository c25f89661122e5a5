//! Shared test utilities.
//!
//! Provides a fixture output directory shaped like a client build (template
//! plus one stylesheet), an echo renderer, and content repository stubs.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_out_dir();
//! let config = test_config(tmp.path(), &["/", "/work"]);
//! let report = prerender(&config, &FailingRepository, &echo_renderer).unwrap();
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{SiteConfig, TemplateConfig};
use crate::content::{ContentError, ContentRepository};
use crate::render::RenderError;
use crate::template::Template;
use crate::types::{ContentRecord, RenderResult, Slug};

/// A client-build `index.html` as the bundler emits it.
pub const TEMPLATE_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" type="image/svg+xml" href="/favicon.svg" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <!--app-head-->
    <script type="module" crossorigin src="/assets/index-D4x9q.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-C2r8w.css">
  </head>
  <body>
    <div id="root"><!--app-html--></div>
  </body>
</html>
"#;

/// Contents of the fixture stylesheet.
pub const FIXTURE_CSS: &str = ".hero{min-height:100vh}";

// =========================================================================
// Fixture setup
// =========================================================================

/// Temp output directory holding `index.html` and `assets/index-C2r8w.css`.
pub fn setup_out_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("index.html"), TEMPLATE_HTML).unwrap();
    fs::create_dir_all(tmp.path().join("assets")).unwrap();
    fs::write(tmp.path().join("assets/index-C2r8w.css"), FIXTURE_CSS).unwrap();
    tmp
}

/// Stock config pointed at `out_dir` with the given static routes.
pub fn test_config(out_dir: &Path, statics: &[&str]) -> SiteConfig {
    let mut config = SiteConfig {
        out_dir: out_dir.to_path_buf(),
        ..SiteConfig::default()
    };
    config.routes.r#static = statics.iter().map(|s| s.to_string()).collect();
    config.cms.project_id = "testproj".to_string();
    config
}

/// [`TEMPLATE_HTML`] parsed with the stock markers and stylesheet pattern.
pub fn default_template() -> Template {
    let cfg = TemplateConfig::default();
    Template::parse(
        TEMPLATE_HTML,
        &cfg.head_marker,
        &cfg.body_marker,
        &cfg.stylesheet_regex().unwrap(),
    )
    .unwrap()
}

// =========================================================================
// Renderer and content stubs
// =========================================================================

/// Render result whose body is `<p>{path}</p>` and title is the path.
pub fn echo_result(path: &str) -> RenderResult {
    let mut result = RenderResult {
        html: format!("<p>{path}</p>"),
        ..Default::default()
    };
    result.head.title = format!("<title>{path}</title>");
    result
}

/// Renderer that never fails and echoes the path.
pub fn echo_renderer(path: &str) -> Result<RenderResult, RenderError> {
    Ok(echo_result(path))
}

/// Content store that is always unreachable.
pub struct FailingRepository;

impl ContentRepository for FailingRepository {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        Err(ContentError::NotConfigured("unreachable in tests".into()))
    }
}

pub fn record_with_slug(slug: &str) -> ContentRecord {
    ContentRecord {
        slug: Some(Slug {
            current: Some(slug.to_string()),
        }),
        ..Default::default()
    }
}

pub fn record_with_image(slug: &str, hero_image_id: &str) -> ContentRecord {
    ContentRecord {
        hero_image_id: Some(hero_image_id.to_string()),
        ..record_with_slug(slug)
    }
}
