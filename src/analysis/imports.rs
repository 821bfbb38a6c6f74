//! Import extraction using tree-sitter for JavaScript/TypeScript.
//!
//! This module parses a source file and returns every module specifier it
//! references, whether through ES module syntax or CommonJS `require()`.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

/// Errors that can occur during import extraction.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    ParseError { path: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The syntactic form an import was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// ES6 import statement: `import ... from 'module'` or `import 'module'`
    ES6,
    /// Re-export: `export { x } from 'module'` or `export * from 'module'`
    ReExport,
    /// CommonJS require: `const x = require('module')`
    CommonJS,
    /// Dynamic import: `import('module')`
    DynamicImport,
}

/// A single module reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The raw specifier (e.g., "react", "./utils", "../lib/index.js")
    pub source: String,
    /// The kind of import
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl Import {
    /// Returns true if the specifier refers to a file path rather than a package.
    pub fn is_local(&self) -> bool {
        is_local_specifier(&self.source)
    }
}

/// Returns true for specifiers that start with a relative or absolute path marker.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(SourceLanguage::JavaScript),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Extracts import specifiers from JavaScript/TypeScript source files.
pub struct ImportAnalyzer {
    js_parser: Parser,
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl ImportAnalyzer {
    /// Create a new ImportAnalyzer.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            js_parser: parser_for(SourceLanguage::JavaScript)?,
            ts_parser: parser_for(SourceLanguage::TypeScript)?,
            tsx_parser: parser_for(SourceLanguage::Tsx)?,
        })
    }

    /// Read a file from disk and extract its imports.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<Vec<Import>> {
        let language = SourceLanguage::from_path(path).ok_or_else(|| {
            AnalysisError::UnsupportedFileType(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })?;

        let content = fs::read_to_string(path)?;
        self.analyze_source(&content, language, path)
    }

    /// Extract imports from source code already in memory.
    ///
    /// `path` is only used to label a [`AnalysisError::ParseError`].
    pub fn analyze_source(
        &mut self,
        source: &str,
        language: SourceLanguage,
        path: &Path,
    ) -> AnalysisResult<Vec<Import>> {
        let parser = match language {
            SourceLanguage::JavaScript => &mut self.js_parser,
            SourceLanguage::TypeScript => &mut self.ts_parser,
            SourceLanguage::Tsx => &mut self.tsx_parser,
        };

        let parse_error = || AnalysisError::ParseError {
            path: path.display().to_string(),
        };

        let tree = parser.parse(source, None).ok_or_else(parse_error)?;
        if tree.root_node().has_error() {
            return Err(parse_error());
        }

        Ok(extract_from_tree(&tree, source))
    }
}

fn parser_for(language: SourceLanguage) -> AnalysisResult<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| AnalysisError::LanguageInit)?;
    Ok(parser)
}

/// Extract the ordered list of imports from source text.
///
/// Convenience wrapper that builds a fresh [`ImportAnalyzer`].
pub fn extract_imports(
    source: &str,
    language: SourceLanguage,
    path: &Path,
) -> AnalysisResult<Vec<Import>> {
    let mut analyzer = ImportAnalyzer::new()?;
    analyzer.analyze_source(source, language, path)
}

fn extract_from_tree(tree: &Tree, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = tree.root_node().walk();
    visit_node(&mut cursor, source, &mut imports);
    imports
}

/// Depth-first walk in document order, so imports come out in source order.
fn visit_node(cursor: &mut TreeCursor, source: &str, imports: &mut Vec<Import>) {
    let node = cursor.node();

    match node.kind() {
        "import_statement" => {
            let found = statement_source(&node, source)
                .map(|spec| (spec, ImportKind::ES6))
                .or_else(|| {
                    require_clause_source(&node, source).map(|spec| (spec, ImportKind::CommonJS))
                });
            if let Some((spec, kind)) = found {
                imports.push(Import {
                    source: spec,
                    kind,
                    line: node.start_position().row + 1,
                });
            }
        }
        "export_statement" => {
            if let Some(spec) = statement_source(&node, source) {
                imports.push(Import {
                    source: spec,
                    kind: ImportKind::ReExport,
                    line: node.start_position().row + 1,
                });
            }
        }
        "call_expression" => {
            if let Some(import) = parse_require_or_dynamic_import(&node, source) {
                imports.push(import);
            }
        }
        _ => {}
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, imports);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// The `from '...'` string of an import or export statement.
///
/// Only the `source` field counts: `export default 'x'` carries a string value
/// that is not a module reference.
fn statement_source(node: &Node, source: &str) -> Option<String> {
    let src = node.child_by_field_name("source")?;
    string_literal_value(&src, source)
}

/// The string in TypeScript's `import x = require('...')`.
fn require_clause_source(node: &Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let clause = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_require_clause")?;
    let src = match clause.child_by_field_name("source") {
        Some(src) => src,
        None => {
            let mut cursor = clause.walk();
            let first = clause
                .named_children(&mut cursor)
                .find(|c| c.kind() == "string")?;
            first
        }
    };
    string_literal_value(&src, source)
}

/// Parse `require('x')` or `import('x')`.
fn parse_require_or_dynamic_import(node: &Node, source: &str) -> Option<Import> {
    let func_node = node.child_by_field_name("function")?;
    let kind = match node_text(&func_node, source)? {
        "require" => ImportKind::CommonJS,
        "import" => ImportKind::DynamicImport,
        _ => return None,
    };

    let args_node = node.child_by_field_name("arguments")?;
    let first_arg = args_node.named_child(0)?;
    let spec = string_literal_value(&first_arg, source)?;

    Some(Import {
        source: spec,
        kind,
        line: node.start_position().row + 1,
    })
}

fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

/// Value of a string or substitution-free template literal, without quotes.
fn string_literal_value(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let mut cursor = node.walk();
            if node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution")
            {
                return None;
            }
        }
        _ => return None,
    }

    let text = node_text(node, source)?;
    let trimmed = text
        .trim_start_matches(['"', '\'', '`'])
        .trim_end_matches(['"', '\'', '`']);
    Some(trimmed.to_string())
}
