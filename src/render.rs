//! Page rendering.
//!
//! Rendering a route to HTML is the job of the site's server entry point,
//! which lives outside this crate. [`Renderer`] is the boundary: one call
//! per route, returning the body fragment and the serialized head tags.
//!
//! [`CommandRenderer`] drives a server entry script as a child process. Any
//! `Fn(&str) -> Result<RenderResult, RenderError>` closure is also a
//! renderer, which is how tests stub the framework out.

use crate::types::RenderResult;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to start renderer '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("renderer output is not valid JSON: {0}")]
    Output(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Renders one route path to a body fragment plus head tags.
pub trait Renderer {
    fn render(&self, path: &str) -> Result<RenderResult, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> Result<RenderResult, RenderError>,
{
    fn render(&self, path: &str) -> Result<RenderResult, RenderError> {
        self(path)
    }
}

/// Runs `<program> <args...> <path>` and parses its stdout as a
/// [`RenderResult`] JSON document.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl CommandRenderer {
    /// Build from a `[program, args...]` list. Returns `None` when empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            dir: None,
        })
    }

    /// Run the command from `dir` (the project root) instead of the
    /// current directory.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, path: &str) -> Result<RenderResult, RenderError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(path).stdin(Stdio::null());
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        let output = command
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
