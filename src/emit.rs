//! Page emission.
//!
//! Turns render results into files under the output directory.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html              # "/"
//! ├── work/index.html         # "/work"
//! ├── work/acme/index.html    # "/work/acme"
//! ├── 404.html                # not-found sentinel render
//! ├── sitemap.xml
//! ├── robots.txt
//! └── _redirects
//! ```
//!
//! ## Head Assembly
//!
//! Each page's head is the renderer's title, meta, link and script tags (in
//! that order), then the landing page's image preloads, then one `<style>`
//! block with the full inlined CSS. Generated tags are built with maud so
//! URLs are attribute-escaped.
//!
//! Every write overwrites. There is no incremental mode and any filesystem
//! error is fatal for the run.

use crate::template::Template;
use crate::types::{HeadTags, OutputFile, OutputKind, RenderResult, Route};
use maud::{PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NOT_FOUND_FILENAME: &str = "404.html";

/// Global the client checks to render its not-found view on hydration.
pub const NOT_FOUND_FLAG: &str = "window.__IS_404__ = true;";

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Output file for a route, relative to the output directory.
///
/// `/` → `index.html`, `/work` → `work/index.html`,
/// `/work/acme/` → `work/acme/index.html`.
pub fn output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        trimmed.split('/').collect::<PathBuf>().join("index.html")
    }
}

/// Serialize the renderer's head groups followed by preloads and the
/// inlined stylesheet.
pub fn assemble_head(head: &HeadTags, preloads: &[String], css: &str) -> String {
    let mut parts: Vec<&str> = [&head.title, &head.meta, &head.link, &head.script]
        .into_iter()
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .collect();

    let generated = html! {
        @for url in preloads {
            link rel="preload" as="image" href=(url) fetchpriority="high";
        }
        style { (PreEscaped(css)) }
    }
    .into_string();
    parts.push(&generated);
    parts.join("\n")
}

/// Inline script marking a page as the not-found view.
pub fn not_found_flag() -> String {
    html! { script { (PreEscaped(NOT_FOUND_FLAG)) } }.into_string()
}

/// Writes pages and auxiliary files into one output directory.
///
/// Holds the template and CSS loaded once at startup; both are read-only
/// for the rest of the run.
pub struct Emitter<'a> {
    out_dir: &'a Path,
    template: &'a Template,
    css: &'a str,
}

impl<'a> Emitter<'a> {
    pub fn new(out_dir: &'a Path, template: &'a Template, css: &'a str) -> Self {
        Self {
            out_dir,
            template,
            css,
        }
    }

    /// Full HTML document for a render result.
    pub fn page_html(&self, result: &RenderResult, preloads: &[String]) -> String {
        let head = assemble_head(&result.head, preloads, self.css);
        self.template.fill(&head, &result.html)
    }

    /// Write a route's page. Preloads are only applied to the root route.
    pub fn write_page(
        &self,
        route: &Route,
        result: &RenderResult,
        preloads: &[String],
    ) -> Result<OutputFile, EmitError> {
        let preloads = if route.is_root() { preloads } else { &[] };
        let html = self.page_html(result, preloads);
        let rel = output_path(&route.path);
        self.write(&rel, &html)?;
        Ok(OutputFile {
            kind: OutputKind::Page,
            route: Some(route.path.clone()),
            path: rel,
        })
    }

    /// Write `404.html` with the not-found flag appended to the head.
    pub fn write_not_found(&self, result: &RenderResult) -> Result<OutputFile, EmitError> {
        let mut head = result.head.clone();
        if !head.script.is_empty() {
            head.script.push('\n');
        }
        head.script.push_str(&not_found_flag());
        let html = self.template.fill(&assemble_head(&head, &[], self.css), &result.html);

        let rel = PathBuf::from(NOT_FOUND_FILENAME);
        self.write(&rel, &html)?;
        Ok(OutputFile {
            kind: OutputKind::NotFound,
            route: None,
            path: rel,
        })
    }

    /// Write an auxiliary file (sitemap, robots, redirects) at the root.
    pub fn write_file(
        &self,
        kind: OutputKind,
        name: &str,
        contents: &str,
    ) -> Result<OutputFile, EmitError> {
        let rel = PathBuf::from(name);
        self.write(&rel, contents)?;
        Ok(OutputFile {
            kind,
            route: None,
            path: rel,
        })
    }

    fn write(&self, rel: &Path, contents: &str) -> Result<(), EmitError> {
        let path = self.out_dir.join(rel);
        let io_err = |source| EmitError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, contents).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TEMPLATE_HTML, default_template, echo_result};
    use tempfile::TempDir;

    #[test]
    fn output_path_root_and_nested() {
        assert_eq!(output_path("/"), PathBuf::from("index.html"));
        assert_eq!(output_path("/work"), PathBuf::from("work/index.html"));
        assert_eq!(
            output_path("/work/my-project"),
            PathBuf::from("work/my-project/index.html")
        );
        assert_eq!(output_path("/about/"), PathBuf::from("about/index.html"));
    }

    #[test]
    fn head_groups_in_order_then_preloads_then_style() {
        let head = HeadTags {
            title: "<title>T</title>".into(),
            meta: "<meta name=\"a\">".into(),
            link: "<link rel=\"canonical\" href=\"/\">".into(),
            script: "<script type=\"application/ld+json\">{}</script>".into(),
        };
        let out = assemble_head(&head, &["https://cdn/x.jpg?w=800&fm=webp".into()], "body{}");
        let title = out.find("<title>").unwrap();
        let meta = out.find("<meta").unwrap();
        let canonical = out.find("canonical").unwrap();
        let script = out.find("ld+json").unwrap();
        let preload = out.find("rel=\"preload\"").unwrap();
        let style = out.find("<style>body{}</style>").unwrap();
        assert!(title < meta && meta < canonical && canonical < script);
        assert!(script < preload && preload < style);
        assert!(out.contains(r#"href="https://cdn/x.jpg?w=800&amp;fm=webp""#));
        assert!(out.contains(r#"as="image""#));
    }

    #[test]
    fn head_with_no_renderer_tags_still_has_style() {
        let out = assemble_head(&HeadTags::default(), &[], "");
        assert_eq!(out, "<style></style>");
    }

    #[test]
    fn preloads_only_on_root() {
        let tmp = TempDir::new().unwrap();
        let template = default_template();
        let emitter = Emitter::new(tmp.path(), &template, "p{}");
        let preloads = vec!["https://cdn/a.jpg".to_string()];

        emitter
            .write_page(&Route::new_static("/"), &echo_result("/"), &preloads)
            .unwrap();
        emitter
            .write_page(&Route::new_static("/work"), &echo_result("/work"), &preloads)
            .unwrap();

        let root = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        let work = fs::read_to_string(tmp.path().join("work/index.html")).unwrap();
        assert!(root.contains("https://cdn/a.jpg"));
        assert!(!work.contains("https://cdn/a.jpg"));
    }

    #[test]
    fn page_has_one_inlined_style_and_no_stylesheet_link() {
        let tmp = TempDir::new().unwrap();
        let template = default_template();
        let css = "h1{color:red}";
        let emitter = Emitter::new(tmp.path(), &template, css);
        let file = emitter
            .write_page(&Route::new_dynamic("/work/a", None), &echo_result("/work/a"), &[])
            .unwrap();

        assert_eq!(file.path, PathBuf::from("work/a/index.html"));
        let html = fs::read_to_string(tmp.path().join(&file.path)).unwrap();
        assert_eq!(html.matches("<style>").count(), 1);
        assert!(html.contains("<style>h1{color:red}</style>"));
        assert!(!html.contains("rel=\"stylesheet\""));
        assert!(html.contains("<p>/work/a</p>"));
    }

    #[test]
    fn rewrite_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("work")).unwrap();
        fs::write(tmp.path().join("work/index.html"), "stale").unwrap();

        let template = default_template();
        let emitter = Emitter::new(tmp.path(), &template, "");
        emitter
            .write_page(&Route::new_static("/work"), &echo_result("/work"), &[])
            .unwrap();
        let html = fs::read_to_string(tmp.path().join("work/index.html")).unwrap();
        assert!(!html.contains("stale"));
    }

    #[test]
    fn not_found_page_carries_flag() {
        let tmp = TempDir::new().unwrap();
        let template = default_template();
        let emitter = Emitter::new(tmp.path(), &template, "");
        let mut result = echo_result("/__missing__");
        result.head.script = "<script>window.x=1</script>".into();

        let file = emitter.write_not_found(&result).unwrap();
        assert_eq!(file.kind, OutputKind::NotFound);
        let html = fs::read_to_string(tmp.path().join(NOT_FOUND_FILENAME)).unwrap();
        assert!(html.contains("<script>window.__IS_404__ = true;</script>"));
        assert!(html.contains("<script>window.x=1</script>"));
        assert!(!html.contains("rel=\"preload\""));
    }

    #[test]
    fn write_failure_is_reported_with_path() {
        let tmp = TempDir::new().unwrap();
        // a file where a directory is needed
        fs::write(tmp.path().join("work"), "file").unwrap();
        let template = default_template();
        let emitter = Emitter::new(tmp.path(), &template, "");
        let err = emitter
            .write_page(&Route::new_static("/work"), &echo_result("/work"), &[])
            .unwrap_err();
        assert!(err.to_string().contains("work"));
    }

    #[test]
    fn template_fixture_is_well_formed() {
        assert!(TEMPLATE_HTML.contains("<!--app-head-->"));
    }
}
