//! Module specifier resolution.
//!
//! Maps a specifier found in a source file to a canonical file path on disk,
//! following Node's relative-path lookup rules. Package imports are never
//! looked up: they are classified [`Resolution::External`] and kept out of
//! the graph.
//!
//! # Probe order
//!
//! For a local specifier joined onto the importing file's directory:
//!
//! 1. the exact path, if it is a file
//! 2. the path with each of [`DEFAULT_EXTENSIONS`] appended, in order
//! 3. if the path is a directory, its package.json `main` entry, then
//!    `index` with each extension appended
//!
//! The first hit wins.

pub mod package_json;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analysis::is_local_specifier;

/// Extensions appended to extensionless specifiers, in priority order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "json",
];

/// Directory names whose contents are treated as vendored code.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules"];

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The specifier names a local file; holds its canonical path.
    Resolved(PathBuf),
    /// A package import, or a path into a vendored directory.
    External,
    /// A local specifier that matched no file.
    Unresolvable,
}

impl Resolution {
    /// Returns the resolved path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Resolved(path) => Some(path),
            _ => None,
        }
    }
}

/// Resolves specifiers against the filesystem.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver {
    /// Creates a resolver with the default extension order and exclusions.
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Replaces the extension probe order. Leading dots are ignored.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Extensions in the order they are probed.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolves `specifier` as written in a file located in `from_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use treepic::resolve::{ModuleResolver, Resolution};
    ///
    /// let resolver = ModuleResolver::new();
    /// assert_eq!(resolver.resolve("react", Path::new("/tmp")), Resolution::External);
    /// ```
    pub fn resolve(&self, specifier: &str, from_dir: &Path) -> Resolution {
        if !is_local_specifier(specifier) {
            return Resolution::External;
        }

        let base = if specifier.starts_with('/') {
            PathBuf::from(specifier)
        } else {
            from_dir.join(specifier)
        };

        let Some(found) = self.probe(&base) else {
            return Resolution::Unresolvable;
        };

        match fs::canonicalize(&found) {
            Ok(canonical) if self.is_excluded(&canonical) => Resolution::External,
            Ok(canonical) => Resolution::Resolved(canonical),
            Err(e) => {
                debug!(path = %found.display(), error = %e, "canonicalize failed");
                Resolution::Unresolvable
            }
        }
    }

    /// Returns true if any component of `path` is an excluded directory.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            self.excluded_dirs.iter().any(|d| d == name.as_ref())
        })
    }

    fn probe(&self, base: &Path) -> Option<PathBuf> {
        self.probe_file(base).or_else(|| {
            if base.is_dir() {
                self.probe_directory(base)
            } else {
                None
            }
        })
    }

    fn probe_file(&self, base: &Path) -> Option<PathBuf> {
        if base.is_file() {
            return Some(base.to_path_buf());
        }

        self.extensions
            .iter()
            .map(|ext| append_extension(base, ext))
            .find(|candidate| candidate.is_file())
    }

    fn probe_directory(&self, dir: &Path) -> Option<PathBuf> {
        let manifest = dir.join("package.json");
        if manifest.is_file() {
            match package_json::parse_file(&manifest) {
                Ok(pkg) => {
                    if let Some(main) = pkg.main_entry() {
                        let main_path = dir.join(main);
                        if let Some(found) = self
                            .probe_file(&main_path)
                            .or_else(|| self.probe_index(&main_path))
                        {
                            return Some(found);
                        }
                    }
                }
                Err(e) => {
                    debug!(path = %manifest.display(), error = %e, "ignoring unreadable package.json");
                }
            }
        }

        self.probe_index(dir)
    }

    fn probe_index(&self, dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        self.extensions
            .iter()
            .map(|ext| dir.join(format!("index.{ext}")))
            .find(|candidate| candidate.is_file())
    }
}

/// Appends `.ext` to the full file name: `a.min` becomes `a.min.js`.
fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        fs::canonicalize(&path).unwrap()
    }

    #[test]
    fn test_bare_specifiers_are_external() {
        let tmp = TempDir::new().unwrap();
        let resolver = ModuleResolver::new();

        for spec in ["react", "@scope/pkg", "lodash/debounce", "node:fs", "fs"] {
            assert_eq!(resolver.resolve(spec, tmp.path()), Resolution::External, "{spec}");
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let tmp = TempDir::new().unwrap();
        let exact = write(tmp.path(), "a.js", "");
        write(tmp.path(), "a.js.ts", "");

        let resolver = ModuleResolver::new();
        assert_eq!(
            resolver.resolve("./a.js", tmp.path()),
            Resolution::Resolved(exact)
        );
    }

    #[test]
    fn test_extension_priority_order() {
        let tmp = TempDir::new().unwrap();
        let js = write(tmp.path(), "a.js", "");
        write(tmp.path(), "a.ts", "");
        write(tmp.path(), "a.json", "{}");
        let ts = write(tmp.path(), "b.ts", "");
        write(tmp.path(), "b.json", "{}");

        let resolver = ModuleResolver::new();
        assert_eq!(resolver.resolve("./a", tmp.path()), Resolution::Resolved(js));
        assert_eq!(resolver.resolve("./b", tmp.path()), Resolution::Resolved(ts));
    }

    #[test]
    fn test_custom_extension_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.js", "");
        let ts = write(tmp.path(), "a.ts", "");

        let resolver = ModuleResolver::new().with_extensions([".ts", "js"]);
        assert_eq!(resolver.extensions(), &["ts".to_string(), "js".to_string()]);
        assert_eq!(resolver.resolve("./a", tmp.path()), Resolution::Resolved(ts));
    }

    #[test]
    fn test_file_beats_directory_index() {
        let tmp = TempDir::new().unwrap();
        let file = write(tmp.path(), "lib.js", "");
        write(tmp.path(), "lib/index.js", "");

        let resolver = ModuleResolver::new();
        assert_eq!(resolver.resolve("./lib", tmp.path()), Resolution::Resolved(file));
    }

    #[test]
    fn test_directory_index() {
        let tmp = TempDir::new().unwrap();
        let index = write(tmp.path(), "utils/index.ts", "");

        let resolver = ModuleResolver::new();
        assert_eq!(
            resolver.resolve("./utils", tmp.path()),
            Resolution::Resolved(index.clone())
        );
        assert_eq!(
            resolver.resolve("./utils/", tmp.path()),
            Resolution::Resolved(index)
        );
    }

    #[test]
    fn test_package_main_beats_index() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pkg/package.json", r#"{"main": "src/entry"}"#);
        let entry = write(tmp.path(), "pkg/src/entry.js", "");
        write(tmp.path(), "pkg/index.js", "");

        let resolver = ModuleResolver::new();
        assert_eq!(resolver.resolve("./pkg", tmp.path()), Resolution::Resolved(entry));
    }

    #[test]
    fn test_broken_package_json_falls_back_to_index() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pkg/package.json", "{ broken");
        let index = write(tmp.path(), "pkg/index.js", "");

        let resolver = ModuleResolver::new();
        assert_eq!(resolver.resolve("./pkg", tmp.path()), Resolution::Resolved(index));
    }

    #[test]
    fn test_parent_and_dot_specifiers() {
        let tmp = TempDir::new().unwrap();
        let root_index = write(tmp.path(), "index.js", "");
        let shared = write(tmp.path(), "shared.js", "");
        let sub = tmp.path().join("sub");
        fs::create_dir_all(&sub).unwrap();

        let resolver = ModuleResolver::new();
        assert_eq!(resolver.resolve("../shared", &sub), Resolution::Resolved(shared));
        assert_eq!(resolver.resolve("..", &sub), Resolution::Resolved(root_index));
    }

    #[test]
    fn test_unresolvable() {
        let tmp = TempDir::new().unwrap();
        let resolver = ModuleResolver::new();

        assert_eq!(
            resolver.resolve("./missing", tmp.path()),
            Resolution::Unresolvable
        );
    }

    #[test]
    fn test_relative_path_into_node_modules_is_external() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "node_modules/dep/index.js", "");

        let resolver = ModuleResolver::new();
        assert_eq!(
            resolver.resolve("./node_modules/dep", tmp.path()),
            Resolution::External
        );
    }

    #[test]
    fn test_absolute_specifier() {
        let tmp = TempDir::new().unwrap();
        let abs = write(tmp.path(), "abs.js", "");
        let spec = tmp.path().join("abs").display().to_string();

        let resolver = ModuleResolver::new();
        assert_eq!(
            resolver.resolve(&spec, Path::new("/")),
            Resolution::Resolved(abs)
        );
    }

    #[test]
    fn test_append_extension_keeps_dots() {
        assert_eq!(
            append_extension(Path::new("/x/a.min"), "js"),
            PathBuf::from("/x/a.min.js")
        );
    }
}
