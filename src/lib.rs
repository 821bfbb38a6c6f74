//! treepic - render the local import graph of a JavaScript/TypeScript module
//!
//! Starting from an entry file, treepic follows every relative `import`,
//! re-export and `require()`, builds a deduplicated module graph (package
//! imports excluded, cycles allowed), serializes it as Graphviz DOT and
//! renders it to an image with the `dot` binary.
//!
//! ```no_run
//! use treepic::{tree_pic, TreePicOptions};
//!
//! # async fn run() -> Result<(), treepic::TreePicError> {
//! let image = tree_pic(
//!     TreePicOptions::new()
//!         .filename("/proj/src/index.js")
//!         .directory("/proj/src"),
//! )
//! .await?;
//! assert_eq!(image, std::path::Path::new("/proj/src/Tree_for_index.png"));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod logger;
pub mod render;
pub mod resolve;

use std::path::{Path, PathBuf};

use tracing::instrument;

pub use config::TreePicOptions;
pub use error::{TreePicError, TreePicResult};

use config::default_image_path;
use error::{DIRECTORY_NOT_PROVIDED, FILENAME_NOT_PROVIDED};
use export::{export_to_string, ExportFormat};
use graph::{GraphBuilder, ModuleGraph};
use render::{GraphvizRenderer, Renderer};

/// Required options after validation.
#[derive(Debug)]
struct Validated<'a> {
    entry: PathBuf,
    directory: &'a Path,
}

fn validate(options: &TreePicOptions) -> TreePicResult<Validated<'_>> {
    let filename = options
        .filename
        .as_deref()
        .ok_or(TreePicError::MissingArgument(FILENAME_NOT_PROVIDED))?;
    let directory = options
        .directory
        .as_deref()
        .ok_or(TreePicError::MissingArgument(DIRECTORY_NOT_PROVIDED))?;

    Ok(Validated {
        entry: directory.join(filename),
        directory,
    })
}

async fn build(entry: &Path, options: &TreePicOptions) -> TreePicResult<ModuleGraph> {
    let graph = GraphBuilder::new()
        .with_max_concurrency(options.max_concurrency)
        .with_max_depth(options.max_depth)
        .build(entry)
        .await?;
    Ok(graph)
}

/// Builds the import graph without rendering it.
pub async fn dependency_graph(options: &TreePicOptions) -> TreePicResult<ModuleGraph> {
    let Validated { entry, .. } = validate(options)?;
    build(&entry, options).await
}

/// Renders the import graph of `options.filename` with Graphviz.
///
/// Returns the image path: `options.image_path` if given, otherwise
/// `<directory>/Tree_for_<entry stem>.png`.
pub async fn tree_pic(options: TreePicOptions) -> TreePicResult<PathBuf> {
    tree_pic_with(options, &GraphvizRenderer::new()).await
}

/// Like [`tree_pic`], with a caller-supplied renderer.
#[instrument(skip_all)]
pub async fn tree_pic_with<R>(options: TreePicOptions, renderer: &R) -> TreePicResult<PathBuf>
where
    R: Renderer + ?Sized,
{
    let Validated { entry, directory } = validate(&options)?;
    renderer.check_available()?;

    let image_path = options
        .image_path
        .clone()
        .unwrap_or_else(|| default_image_path(directory, &entry));

    let graph = build(&entry, &options).await?;
    let dot = export_to_string(ExportFormat::Dot, &graph).map_err(TreePicError::Export)?;

    Ok(renderer.render(&dot, &image_path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_filename_first() {
        let err = validate(&TreePicOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "filename not provided");

        let err = validate(&TreePicOptions::new().directory("/d")).unwrap_err();
        assert_eq!(err.to_string(), "filename not provided");
    }

    #[test]
    fn test_validate_requires_directory() {
        let err = validate(&TreePicOptions::new().filename("/d/index.js")).unwrap_err();
        assert_eq!(err.to_string(), "directory not provided");
    }

    #[test]
    fn test_relative_filename_joins_directory() {
        let options = TreePicOptions::new().filename("src/index.js").directory("/proj");
        assert_eq!(validate(&options).unwrap().entry, PathBuf::from("/proj/src/index.js"));

        let options = TreePicOptions::new().filename("/abs/index.js").directory("/proj");
        assert_eq!(validate(&options).unwrap().entry, PathBuf::from("/abs/index.js"));
    }
}
