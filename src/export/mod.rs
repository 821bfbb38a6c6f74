//! Serializers for a built [`ModuleGraph`].
//!
//! - DOT: the Graphviz graph-description language fed to the renderer
//! - JSON: machine-readable nodes, edges, cycles and diagnostics
//! - Tree: an indented text tree rooted at the entry module

pub mod dot;
pub mod json;
pub mod tree;

use crate::graph::ModuleGraph;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT
    Dot,
    /// JSON format - machine-readable, full data
    Json,
    /// Indented text tree
    Tree,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" => Ok(ExportFormat::Dot),
            "json" => Ok(ExportFormat::Json),
            "tree" | "text" => Ok(ExportFormat::Tree),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: dot, json, tree",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Dot => write!(f, "dot"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Tree => write!(f, "tree"),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the graph to the given writer.
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()>;
}

/// Export the graph in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    graph: &ModuleGraph,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Dot => dot::DotExporter.export(graph, writer),
        ExportFormat::Json => json::JsonExporter.export(graph, writer),
        ExportFormat::Tree => tree::TreeExporter.export(graph, writer),
    }
}

/// Export the graph to a string.
pub fn export_to_string(format: ExportFormat, graph: &ModuleGraph) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("dot".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert_eq!("GV".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("tree".parse::<ExportFormat>().unwrap(), ExportFormat::Tree);
        assert!("png".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Dot), "dot");
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Tree), "tree");
    }

    #[test]
    fn test_export_to_string_each_format() {
        let mut graph = ModuleGraph::new("/app/index.js");
        graph.add_module("/app/a.js", 1);
        graph.add_edge("/app/index.js", "/app/a.js");

        for format in [ExportFormat::Dot, ExportFormat::Json, ExportFormat::Tree] {
            let out = export_to_string(format, &graph).unwrap();
            assert!(out.contains("index"), "{format}: {out}");
        }
    }
}
