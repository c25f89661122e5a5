//! # Prerender
//!
//! Build-time static prerendering for a CMS-backed marketing site. After the
//! client bundle is built, this crate renders every route to HTML through the
//! site's server entry point and writes a deployable static tree: one page
//! per route, a 404 page, `sitemap.xml`, `robots.txt` and `_redirects`.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Enumerate  seed routes + CMS records  →  ordered route list
//! 2. Resolve    first CMS records          →  landing-page image preloads
//! 3. Render     route                      →  body fragment + head tags
//! 4. Emit       template + render + CSS    →  dist/<route>/index.html
//! ```
//!
//! Stages run strictly in sequence on one thread. The only network I/O is a
//! single content fetch at the start; the template and CSS are loaded once
//! and shared read-only by every iteration.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`routes`] | Stage 1: static + dynamic route enumeration with fetch fallback |
//! | [`assets`] | Stage 2: preload URL derivation from CMS image references |
//! | [`render`] | Stage 3: the [`render::Renderer`] boundary and its process-backed impl |
//! | [`emit`] | Stage 4: head assembly, output paths, page and 404 writes |
//! | [`pipeline`] | Runs all stages and returns a [`pipeline::BuildReport`] |
//! | [`content`] | [`content::ContentRepository`] seam: Sanity API, JSON export, in-memory |
//! | [`template`] | Template contract validation, CSS collection, splicing |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` |
//! | [`redirects`] | `_redirects` table for the static host |
//! | [`image_ref`] | `image-<id>-<w>x<h>` identifier parser |
//! | [`config`] | `prerender.toml` loading, merging and validation |
//! | [`types`] | Shared value types (`Route`, `ContentRecord`, `RenderResult`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Partial Failure
//!
//! A CMS outage must not block a deploy: a failed content fetch degrades to
//! the static routes. A route whose render throws is reported and skipped
//! while the rest of the site is still written. Filesystem errors, on the
//! other hand, abort the run; a half-written build artifact is worthless.
//!
//! ## Renderer as a Process
//!
//! The server entry point is JavaScript produced by the site's bundler. It is
//! invoked as a child process speaking JSON on stdout, keeping this binary
//! free of any embedded JS runtime. Tests substitute a closure.
//!
//! ## CSS Inlining
//!
//! The bundler's external stylesheet link is stripped and its contents are
//! inlined into every page, so first paint needs no extra request.

pub mod assets;
pub mod config;
pub mod content;
pub mod emit;
pub mod image_ref;
pub mod output;
pub mod pipeline;
pub mod redirects;
pub mod render;
pub mod routes;
pub mod sitemap;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
