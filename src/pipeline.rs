//! End-to-end prerender run.
//!
//! ```text
//! load template + CSS ─┐
//! enumerate routes ────┼─> preloads ─> sitemap ─> render+write per route ─> 404 ─> robots, _redirects
//! (content fetch)  ────┘
//! ```
//!
//! Failure policy per stage:
//!
//! | Stage | On failure |
//! |-------|------------|
//! | config validation | fatal, nothing written |
//! | template / CSS load | fatal |
//! | content fetch | logged, static routes only |
//! | image ref parse | entry skipped silently |
//! | render (per route, incl. 404) | logged, route recorded in [`BuildReport::failed`] |
//! | any file write | fatal |

use crate::assets::{ImageCdn, resolve_preloads};
use crate::config::{ConfigError, SiteConfig};
use crate::content::ContentRepository;
use crate::emit::{EmitError, Emitter};
use crate::redirects::{REDIRECTS_FILENAME, build_redirects};
use crate::render::{RenderError, Renderer};
use crate::routes::enumerate;
use crate::sitemap::{SITEMAP_FILENAME, build_robots, build_sitemap};
use crate::template::{Template, TemplateError, load_css};
use crate::types::{OutputFile, OutputKind, Route};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum PrerenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// A route whose render call failed.
#[derive(Debug)]
pub struct FailedRoute {
    pub route: String,
    pub error: RenderError,
}

/// Everything a finished run produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub routes: Vec<Route>,
    pub preloads: Vec<String>,
    pub written: Vec<OutputFile>,
    pub failed: Vec<FailedRoute>,
    /// Content fetch error message when dynamic routes were omitted.
    pub content_error: Option<String>,
}

impl BuildReport {
    /// True when every route, and the 404 page, rendered.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn pages(&self) -> impl Iterator<Item = &OutputFile> {
        self.written.iter().filter(|f| f.kind == OutputKind::Page)
    }
}

/// Run the whole pipeline into `config.out_dir`.
pub fn prerender(
    config: &SiteConfig,
    repo: &dyn ContentRepository,
    renderer: &dyn Renderer,
) -> Result<BuildReport, PrerenderError> {
    config.validate()?;
    let template = Template::load(config)?;
    let css = load_css(&config.css_dir())?;
    let emitter = Emitter::new(&config.out_dir, &template, &css);

    let enumeration = enumerate(&config.routes, repo);
    let cdn = ImageCdn::new(&config.preload, &config.cms);
    let preloads = resolve_preloads(&enumeration.records, &cdn, config.preload.count);
    info!(
        routes = enumeration.routes.len(),
        preloads = preloads.len(),
        "starting prerender"
    );

    let mut report = BuildReport {
        content_error: enumeration.fetch_error.map(|e| e.to_string()),
        preloads,
        ..BuildReport::default()
    };

    let sitemap = build_sitemap(&config.site_url, &enumeration.routes);
    report
        .written
        .push(emitter.write_file(OutputKind::Sitemap, SITEMAP_FILENAME, &sitemap)?);

    for route in &enumeration.routes {
        match renderer.render(&route.path) {
            Ok(result) => {
                let file = emitter.write_page(route, &result, &report.preloads)?;
                info!(route = %route.path, file = %file.path.display(), "prerendered");
                report.written.push(file);
            }
            Err(err) => {
                error!(route = %route.path, error = %err, "render failed");
                report.failed.push(FailedRoute {
                    route: route.path.clone(),
                    error: err,
                });
            }
        }
    }

    let not_found = &config.routes.not_found_path;
    match renderer.render(not_found) {
        Ok(result) => report.written.push(emitter.write_not_found(&result)?),
        Err(err) => {
            error!(route = %not_found, error = %err, "render of 404 page failed");
            report.failed.push(FailedRoute {
                route: not_found.clone(),
                error: err,
            });
        }
    }

    if config.robots.enabled {
        let robots = build_robots(&config.site_url, &config.robots);
        report
            .written
            .push(emitter.write_file(OutputKind::Robots, "robots.txt", &robots)?);
    }
    if let Some(redirects) = build_redirects(&config.redirects) {
        report.written.push(emitter.write_file(
            OutputKind::Redirects,
            REDIRECTS_FILENAME,
            &redirects,
        )?);
    }

    report.routes = enumeration.routes;
    Ok(report)
}
