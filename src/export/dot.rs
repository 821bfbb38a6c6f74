//! Graphviz DOT export.
//!
//! Node identifiers are the canonical paths, always quoted, so any path is a
//! valid ID. Output is sorted and therefore identical across runs.

use super::Exporter;
use crate::graph::ModuleGraph;
use std::io::{self, Write};

/// DOT exporter implementation.
pub struct DotExporter;

/// Escape a string for use inside a double-quoted DOT ID or label.
pub fn escape(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Quote a string as a DOT ID.
pub fn quote(input: &str) -> String {
    format!("\"{}\"", escape(input))
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "digraph {} {{", quote(&graph.entry().label))?;
        writeln!(writer, "  rankdir=TB;")?;
        writeln!(writer, "  node [shape=box, style=rounded, fontname=\"Helvetica\"];")?;
        writeln!(writer, "  edge [arrowsize=0.8];")?;

        let modules = graph.modules();
        if !modules.is_empty() {
            writeln!(writer)?;
        }
        for node in modules {
            let id = node.path.display().to_string();
            writeln!(writer, "  {} [label={}];", quote(&id), quote(&node.label))?;
        }

        let edges = graph.edges();
        if !edges.is_empty() {
            writeln!(writer)?;
        }
        for (from, to, _) in edges {
            writeln!(
                writer,
                "  {} -> {};",
                quote(&from.path.display().to_string()),
                quote(&to.path.display().to_string())
            )?;
        }

        writeln!(writer, "}}")
    }
}
