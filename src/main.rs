use clap::{Parser, Subcommand};
use prerender::assets::{ImageCdn, resolve_preloads};
use prerender::config::{self, SiteConfig};
use prerender::content::{ContentRepository, repository_from_config};
use prerender::render::CommandRenderer;
use prerender::template::{Template, load_css};
use prerender::{output, pipeline, routes};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "prerender")]
#[command(about = "Prerender a CMS-backed single-page site into static HTML")]
#[command(long_about = "\
Prerender a CMS-backed single-page site into static HTML

Runs after the client bundle is built. Every route is rendered through the
site's server entry point and poured into the built index.html:

  dist/
  ├── index.html                   # Template in, prerendered home page out
  ├── assets/*.css                 # Inlined into every page
  ├── work/index.html              # One directory per route
  ├── work/<slug>/index.html       # One per published CMS record
  ├── 404.html                     # Not-found page with the 404 flag set
  ├── sitemap.xml
  ├── robots.txt
  └── _redirects                   # Legacy URL table for the static host

Pipeline:
  1. Enumerate  static routes + CMS slugs (CMS outage → static routes only)
  2. Resolve    preload URLs for the first CMS hero images
  3. Render     each route via renderer.command, JSON on stdout
  4. Emit       head tags, preloads and inlined CSS spliced into the template

The home page replaces index.html, so each build needs a fresh client
bundle; running build twice over the same output is reported as an error.

Run 'prerender gen-config' to generate a documented prerender.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root; relative config paths resolve against it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file [default: <root>/prerender.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured output directory
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: enumerate → resolve → render → emit (default)
    Build,
    /// Print the routes that would be prerendered
    Routes,
    /// Print the landing-page image preload URLs
    Preloads,
    /// Validate config, template and stylesheets without rendering
    Check,
    /// Print a stock prerender.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => {
            let site = load_site_config(cli)?;
            let repo = repository_from_config(&site.cms, &cli.root);
            let renderer = CommandRenderer::from_command(&site.renderer.command)
                .ok_or("renderer.command must not be empty")?
                .in_dir(&cli.root);

            println!("==> Prerendering into {}", site.out_dir.display());
            let report = pipeline::prerender(&site, repo.as_ref(), &renderer)?;
            output::print_build_output(&report);

            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
            println!("==> Build complete: {}", site.out_dir.display());
        }
        Command::Routes => {
            let site = load_site_config(cli)?;
            let repo = repository_from_config(&site.cms, &cli.root);
            let enumeration = routes::enumerate(&site.routes, repo.as_ref());
            output::print_routes_output(&enumeration.routes);
        }
        Command::Preloads => {
            let site = load_site_config(cli)?;
            let repo = repository_from_config(&site.cms, &cli.root);
            output::print_preloads_output(&preloads(&site, repo.as_ref()));
        }
        Command::Check => {
            let site = load_site_config(cli)?;
            println!("==> Checking {}", site.template_path().display());
            let template = Template::load(&site)?;
            let css = load_css(&site.css_dir())?;
            debug!(
                stripped = template.stripped_stylesheet(),
                css_bytes = css.len(),
                "template loaded"
            );
            println!("==> Template and config are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Log to stderr; `-v` lowers the default level to debug.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config and anchor its output directory at the project root.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site = match &cli.config {
        Some(file) => {
            debug!(file = %file.display(), "loading config");
            config::load_config_file(file)?
        }
        None => config::load_config(&cli.root)?,
    };
    let out_dir = cli.out_dir.as_ref().unwrap_or(&site.out_dir);
    site.out_dir = resolve_against(&cli.root, out_dir);
    Ok(site)
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn preloads(site: &SiteConfig, repo: &dyn ContentRepository) -> Vec<String> {
    let enumeration = routes::enumerate(&site.routes, repo);
    let cdn = ImageCdn::new(&site.preload, &site.cms);
    resolve_preloads(&enumeration.records, &cdn, site.preload.count)
}
