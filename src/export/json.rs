//! JSON export implementation.
//!
//! Exports the module graph in JSON format for machine-readable output.

use super::Exporter;
use crate::graph::{Diagnostic, ModuleGraph};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable module for JSON output.
#[derive(Serialize)]
struct JsonModule {
    path: String,
    label: String,
    depth: usize,
}

/// Serializable edge for JSON output.
#[derive(Serialize)]
struct JsonEdge {
    from: String,
    to: String,
    imports: usize,
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle {
    modules: Vec<String>,
    path: String,
}

/// Serializable soft failure for JSON output.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonDiagnostic {
    Unresolved { from: String, specifier: String },
    ParseFailed { path: String, message: String },
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    modules: usize,
    edges: usize,
    max_depth: usize,
    circular_dependencies: usize,
    diagnostics: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    entry: String,
    summary: JsonSummary,
    modules: Vec<JsonModule>,
    edges: Vec<JsonEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_dependencies: Vec<JsonCycle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<JsonDiagnostic>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        let modules: Vec<JsonModule> = graph
            .modules()
            .into_iter()
            .map(|n| JsonModule {
                path: n.path.display().to_string(),
                label: n.label.clone(),
                depth: n.depth,
            })
            .collect();

        let edges: Vec<JsonEdge> = graph
            .edges()
            .into_iter()
            .map(|(from, to, edge)| JsonEdge {
                from: from.path.display().to_string(),
                to: to.path.display().to_string(),
                imports: edge.import_count,
            })
            .collect();

        let circular_dependencies: Vec<JsonCycle> = graph
            .detect_cycles()
            .iter()
            .map(|c| JsonCycle {
                modules: c.nodes.iter().map(|p| p.display().to_string()).collect(),
                path: c.cycle_path(),
            })
            .collect();

        let diagnostics: Vec<JsonDiagnostic> = graph
            .diagnostics()
            .iter()
            .map(|d| match d {
                Diagnostic::Unresolved { from, specifier } => JsonDiagnostic::Unresolved {
                    from: from.display().to_string(),
                    specifier: specifier.clone(),
                },
                Diagnostic::ParseFailed { path, message } => JsonDiagnostic::ParseFailed {
                    path: path.display().to_string(),
                    message: message.clone(),
                },
            })
            .collect();

        let export = JsonExport {
            entry: graph.entry().path.display().to_string(),
            summary: JsonSummary {
                modules: modules.len(),
                edges: edges.len(),
                max_depth: graph.max_depth(),
                circular_dependencies: circular_dependencies.len(),
                diagnostics: diagnostics.len(),
            },
            modules,
            edges,
            circular_dependencies,
            diagnostics,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
