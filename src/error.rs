//! Top-level error type for [`tree_pic`](crate::tree_pic).

use thiserror::Error;

use crate::graph::GraphError;
use crate::render::RenderError;

/// Message when no entry file is given.
pub const FILENAME_NOT_PROVIDED: &str = "filename not provided";

/// Message when no base directory is given.
pub const DIRECTORY_NOT_PROVIDED: &str = "directory not provided";

/// Errors that reject a whole invocation.
#[derive(Error, Debug)]
pub enum TreePicError {
    /// A required option was missing; displays as the bare message.
    #[error("{0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to serialize graph: {0}")]
    Export(#[source] std::io::Error),
}

/// Result type for top-level operations.
pub type TreePicResult<T> = Result<T, TreePicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message_is_bare() {
        assert_eq!(
            TreePicError::MissingArgument(FILENAME_NOT_PROVIDED).to_string(),
            "filename not provided"
        );
        assert_eq!(
            TreePicError::MissingArgument(DIRECTORY_NOT_PROVIDED).to_string(),
            "directory not provided"
        );
    }

    #[test]
    fn test_render_error_is_transparent() {
        let err: TreePicError = RenderError::BinaryNotFound {
            binary: "dot".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Graphviz could not be found. Ensure that \"dot\" is in your $PATH."
        );
    }
}
