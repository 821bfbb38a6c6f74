//! Source code analysis module for treepic.
//!
//! This module extracts module specifiers from JavaScript/TypeScript source
//! code so the graph builder can follow them.
//!
//! # Features
//!
//! - Parse ES6 `import` statements (default, named, namespace, side-effect)
//! - Parse re-exports (`export ... from`)
//! - Parse CommonJS `require()` calls and dynamic `import()`
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use treepic::analysis::{extract_imports, SourceLanguage};
//!
//! let source = "import a from './a';\nconst b = require('./b');";
//! let imports = extract_imports(source, SourceLanguage::JavaScript, Path::new("index.js")).unwrap();
//!
//! let specifiers: Vec<_> = imports.iter().map(|i| i.source.as_str()).collect();
//! assert_eq!(specifiers, vec!["./a", "./b"]);
//! ```

pub mod imports;

pub use imports::{
    extract_imports, is_local_specifier, AnalysisError, AnalysisResult, Import, ImportAnalyzer,
    ImportKind, SourceLanguage,
};
