//! Minimal package.json reader for directory imports.
//!
//! When a relative specifier points at a directory, Node looks at that
//! directory's package.json `main` field before falling back to `index`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur during package.json parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The subset of package.json fields that affect module resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    /// The name of the package.
    pub name: Option<String>,

    /// Entry point used when the package directory itself is imported.
    pub main: Option<String>,
}

impl PackageJson {
    /// Returns the `main` entry if it is set to something other than blank.
    pub fn main_entry(&self) -> Option<&str> {
        self.main
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Parses a package.json file from a file path.
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use treepic::resolve::package_json::parse_str;
///
/// let pkg = parse_str(r#"{"name": "lib", "main": "dist/lib.js"}"#).unwrap();
/// assert_eq!(pkg.main_entry(), Some("dist/lib.js"));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    let pkg: PackageJson = serde_json::from_str(content)?;
    Ok(pkg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_main() {
        let pkg = parse_str(r#"{"name": "my-lib", "main": "./lib/main.js", "version": "1.0.0"}"#)
            .unwrap();
        assert_eq!(pkg.name.as_deref(), Some("my-lib"));
        assert_eq!(pkg.main_entry(), Some("./lib/main.js"));
    }

    #[test]
    fn test_missing_or_blank_main() {
        assert_eq!(parse_str(r#"{"name": "x"}"#).unwrap().main_entry(), None);
        assert_eq!(parse_str(r#"{"main": "  "}"#).unwrap().main_entry(), None);
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_str("{ not json");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_file(Path::new("/definitely/not/here/package.json"));
        assert!(matches!(result, Err(ParseError::IoError(_))));
    }
}
