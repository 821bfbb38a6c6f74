//! Invocation options.
//!
//! [`TreePicOptions`] is the library-level configuration. The CLI maps its
//! arguments (and `TREEPIC_*` environment variables) onto it.

use std::path::{Path, PathBuf};

use crate::graph::default_concurrency;

/// File name prefix for images written without an explicit path.
pub const IMAGE_PREFIX: &str = "Tree_for_";

/// Extension for images written without an explicit path.
pub const IMAGE_EXTENSION: &str = "png";

/// Options for one [`tree_pic`](crate::tree_pic) call.
///
/// `filename` and `directory` are required; they are `Option`s so a missing
/// value is reported as an error rather than being unrepresentable.
#[derive(Debug, Clone)]
pub struct TreePicOptions {
    /// Entry source file; relative paths are taken from `directory`
    pub filename: Option<PathBuf>,
    /// Base directory for the entry file and the default image
    pub directory: Option<PathBuf>,
    /// Explicit output image path
    pub image_path: Option<PathBuf>,
    /// Files scanned at once
    pub max_concurrency: usize,
    /// Stop following imports at this depth
    pub max_depth: Option<usize>,
}

impl Default for TreePicOptions {
    fn default() -> Self {
        Self {
            filename: None,
            directory: None,
            image_path: None,
            max_concurrency: default_concurrency(),
            max_depth: None,
        }
    }
}

impl TreePicOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn image_path(mut self, image_path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// `<directory>/Tree_for_<entry stem>.png`
///
/// ```
/// use std::path::Path;
/// use treepic::config::default_image_path;
///
/// assert_eq!(
///     default_image_path(Path::new("/proj"), Path::new("src/index.js")),
///     Path::new("/proj/Tree_for_index.png"),
/// );
/// ```
pub fn default_image_path(directory: &Path, entry: &Path) -> PathBuf {
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    directory.join(format!("{IMAGE_PREFIX}{stem}.{IMAGE_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_setters() {
        let options = TreePicOptions::new()
            .filename("index.js")
            .directory("/proj")
            .image_path("/tmp/out.svg")
            .max_concurrency(3)
            .max_depth(Some(2));

        assert_eq!(options.filename.as_deref(), Some(Path::new("index.js")));
        assert_eq!(options.directory.as_deref(), Some(Path::new("/proj")));
        assert_eq!(options.image_path.as_deref(), Some(Path::new("/tmp/out.svg")));
        assert_eq!(options.max_concurrency, 3);
        assert_eq!(options.max_depth, Some(2));
    }

    #[test]
    fn test_defaults() {
        let options = TreePicOptions::default();
        assert!(options.filename.is_none());
        assert!(options.directory.is_none());
        assert!(options.max_concurrency >= 1);
        assert!(options.max_depth.is_none());
    }

    #[test]
    fn test_default_image_path() {
        assert_eq!(
            default_image_path(Path::new("/d"), Path::new("/d/index.js")),
            PathBuf::from("/d/Tree_for_index.png")
        );
        assert_eq!(
            default_image_path(Path::new("/d"), Path::new("/elsewhere/app.component.ts")),
            PathBuf::from("/d/Tree_for_app.component.png")
        );
    }
}
