//! Text tree export.
//!
//! Unfolds the graph into a tree rooted at the entry module. Each module's
//! imports are expanded only the first time it is printed; later
//! occurrences are marked `(seen)`, and an import back into the current
//! ancestor chain is marked `(circular)`.

use super::Exporter;
use crate::graph::ModuleGraph;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Why a tree node was not expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeMarker {
    /// Already expanded elsewhere in the tree
    Seen,
    /// Imports one of its own ancestors
    Circular,
}

impl TreeMarker {
    pub fn suffix(&self) -> &'static str {
        match self {
            TreeMarker::Seen => " (seen)",
            TreeMarker::Circular => " (circular)",
        }
    }
}

/// A node in the unfolded import tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display label
    pub label: String,
    /// Canonical module path
    pub path: PathBuf,
    /// Imported modules, sorted by path
    pub children: Vec<TreeNode>,
    /// Depth in the tree (0 = root)
    pub depth: usize,
    pub marker: Option<TreeMarker>,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(label: String, path: PathBuf) -> Self {
        Self {
            label,
            path,
            children: Vec::new(),
            depth: 0,
            marker: None,
        }
    }

    /// Add a child node
    pub fn add_child(&mut self, mut child: TreeNode) {
        child.depth = self.depth + 1;
        self.children.push(child);
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Unfold `graph` from its entry module.
    pub fn from_graph(graph: &ModuleGraph) -> Self {
        let entry = graph.entry();
        let mut root = TreeNode::new(entry.label.clone(), entry.path.clone());
        let mut expanded = HashSet::new();
        let mut ancestors = Vec::new();
        root.unfold(graph, &mut expanded, &mut ancestors);
        root
    }

    fn unfold(
        &mut self,
        graph: &ModuleGraph,
        expanded: &mut HashSet<PathBuf>,
        ancestors: &mut Vec<PathBuf>,
    ) {
        expanded.insert(self.path.clone());
        ancestors.push(self.path.clone());

        for import in graph.imports_of(&self.path) {
            let mut child = TreeNode::new(import.label.clone(), import.path.clone());
            if ancestors.iter().any(|a| a == &import.path) {
                child.marker = Some(TreeMarker::Circular);
            } else if expanded.contains(&import.path) {
                child.marker = Some(TreeMarker::Seen);
            }
            self.add_child(child);
        }

        for child in &mut self.children {
            if child.marker.is_none() && !expanded.contains(&child.path) {
                child.unfold(graph, expanded, ancestors);
            } else if child.marker.is_none() {
                // Expanded by an earlier sibling's subtree.
                child.marker = Some(TreeMarker::Seen);
            }
        }

        ancestors.pop();
    }

    /// Flatten the tree into display order.
    pub fn flatten(&self) -> Vec<FlattenedNode> {
        let mut result = Vec::new();
        self.flatten_recursive(&mut result, true, &mut Vec::new());
        result
    }

    fn flatten_recursive(
        &self,
        result: &mut Vec<FlattenedNode>,
        is_last: bool,
        ancestors_are_last: &mut Vec<bool>,
    ) {
        result.push(FlattenedNode {
            label: self.label.clone(),
            path: self.path.clone(),
            depth: self.depth,
            is_last_child: is_last,
            ancestors_are_last: ancestors_are_last.clone(),
            marker: self.marker,
        });

        if self.depth > 0 {
            ancestors_are_last.push(is_last);
        }
        let child_count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.flatten_recursive(result, i == child_count - 1, ancestors_are_last);
        }
        if self.depth > 0 {
            ancestors_are_last.pop();
        }
    }
}

/// A flattened representation of a tree node for printing
#[derive(Debug, Clone)]
pub struct FlattenedNode {
    pub label: String,
    pub path: PathBuf,
    /// Depth in the tree
    pub depth: usize,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
    /// For each ancestor below the root, whether it was a last child
    pub ancestors_are_last: Vec<bool>,
    pub marker: Option<TreeMarker>,
}

impl FlattenedNode {
    /// Build the tree prefix (indentation and branch lines)
    pub fn tree_prefix(&self) -> String {
        let mut prefix = String::new();

        for &is_last in &self.ancestors_are_last {
            if is_last {
                prefix.push_str("    ");
            } else {
                prefix.push_str("│   ");
            }
        }

        if self.depth > 0 {
            if self.is_last_child {
                prefix.push_str("└── ");
            } else {
                prefix.push_str("├── ");
            }
        }

        prefix
    }

    /// The full printed line, without a trailing newline.
    pub fn line(&self) -> String {
        format!(
            "{}{}{}",
            self.tree_prefix(),
            self.label,
            self.marker.map_or("", |m| m.suffix())
        )
    }

    pub fn is_for(&self, path: &Path) -> bool {
        self.path == path
    }
}

/// Text tree exporter implementation.
pub struct TreeExporter;

impl Exporter for TreeExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        for node in TreeNode::from_graph(graph).flatten() {
            writeln!(writer, "{}", node.line())?;
        }
        Ok(())
    }
}
