//! Image rendering through an external Graphviz binary.
//!
//! [`Renderer`] is the seam between graph construction and the subprocess:
//! the library talks to it only through [`Renderer::render`], so tests can
//! swap in a fake.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Binary invoked by [`GraphvizRenderer`] unless overridden.
pub const DEFAULT_BINARY: &str = "dot";

/// Image format used when the output path has no extension.
pub const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Names the binary that is actually run (`dot` by default) rather than
    /// another Graphviz tool.
    #[error("Graphviz could not be found. Ensure that \"{binary}\" is in your $PATH.")]
    BinaryNotFound { binary: String },

    #[error("Graphviz exited with {status}: {stderr}")]
    RenderFailed { status: String, stderr: String },

    #[error("Render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Turns DOT text into an image file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Fails before writing anything if the renderer is unavailable.
    fn check_available(&self) -> RenderResult<()>;

    /// Renders `dot` into `output` and returns the written path.
    async fn render(&self, dot: &str, output: &Path) -> RenderResult<PathBuf>;
}

/// Renders with the Graphviz `dot` command.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: String,
    search_path: Option<OsString>,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphvizRenderer {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            search_path: None,
        }
    }

    /// Use another Graphviz layout binary (e.g. `neato`) or an explicit path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Search these directories instead of `$PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Absolute location of the binary, if it can be found.
    pub fn locate(&self) -> Option<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| env::var_os("PATH"))
            .unwrap_or_default();
        find_executable(&self.binary, &search_path)
    }
}

#[async_trait]
impl Renderer for GraphvizRenderer {
    fn check_available(&self) -> RenderResult<()> {
        self.locate().map(|_| ()).ok_or_else(|| RenderError::BinaryNotFound {
            binary: self.binary.clone(),
        })
    }

    #[instrument(skip(self, dot, output), fields(output = %output.display()))]
    async fn render(&self, dot: &str, output: &Path) -> RenderResult<PathBuf> {
        let binary = self.locate().ok_or_else(|| RenderError::BinaryNotFound {
            binary: self.binary.clone(),
        })?;

        // Graphviz writes into the staging directory; `output` and its parent
        // directories are only touched once it succeeds. Dropping `staging`
        // removes the DOT source and any partial image.
        let staging = tempfile::Builder::new().prefix("treepic-").tempdir()?;
        let source = staging.path().join("graph.gv");
        tokio::fs::write(&source, dot).await?;

        let format = image_format(output);
        let staged = staging.path().join(format!("image.{format}"));
        debug!(binary = %binary.display(), %format, source = %source.display(), "running graphviz");

        let result = Command::new(&binary)
            .arg(format!("-T{format}"))
            .arg("-o")
            .arg(&staged)
            .arg(&source)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            return Err(RenderError::RenderFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        install(&staged, output).await?;

        info!(path = %output.display(), "image rendered");
        Ok(output.to_path_buf())
    }
}

/// Moves a rendered image into place, copying when a rename cannot cross
/// filesystems.
async fn install(staged: &Path, output: &Path) -> std::io::Result<()> {
    if let Err(e) = tokio::fs::rename(staged, output).await {
        debug!(error = %e, "rename failed, copying image instead");
        tokio::fs::copy(staged, output).await?;
    }
    Ok(())
}

/// Graphviz `-T` value for an output path: its lowercased extension, or png.
pub fn image_format(output: &Path) -> String {
    output
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string())
}

/// Finds `binary` in the directories of a `PATH`-style list.
///
/// A name containing a path separator is checked as-is.
pub fn find_executable(binary: &str, search_path: &std::ffi::OsStr) -> Option<PathBuf> {
    let direct = Path::new(binary);
    if direct.components().count() > 1 {
        return is_executable(direct).then(|| direct.to_path_buf());
    }

    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, binary: &str) -> Vec<PathBuf> {
    vec![dir.join(binary), dir.join(format!("{binary}.exe"))]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, binary: &str) -> Vec<PathBuf> {
    vec![dir.join(binary)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
