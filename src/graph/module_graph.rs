//! Module graph implementation using petgraph.
//!
//! Nodes are source files keyed by canonical path, edges are "imports"
//! relationships. Cycles are allowed: the graph is a plain node/edge set,
//! not a nested tree.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A source file in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Canonical absolute path; the node's identity
    pub path: PathBuf,
    /// Display label (file name without extension)
    pub label: String,
    /// Breadth-first distance from the entry file (entry = 0)
    pub depth: usize,
}

impl ModuleNode {
    /// Creates a node, deriving its label from the file stem.
    ///
    /// ```rust
    /// use treepic::graph::ModuleNode;
    ///
    /// let node = ModuleNode::new("/src/lib/utils.js", 1);
    /// assert_eq!(node.label, "utils");
    /// ```
    pub fn new(path: impl Into<PathBuf>, depth: usize) -> Self {
        let path = path.into();
        let label = display_label(&path);
        Self { path, label, depth }
    }
}

/// File name without its extension, falling back to the full path.
pub fn display_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// An "imports" relationship.
///
/// Repeated imports of the same target from the same file share one edge;
/// `import_count` records how many statements collapsed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub import_count: usize,
}

impl Default for DependencyEdge {
    fn default() -> Self {
        Self { import_count: 1 }
    }
}

/// A problem found during traversal that did not stop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A local specifier matched no file.
    Unresolved { from: PathBuf, specifier: String },
    /// A visited file could not be read or parsed; it has no outgoing edges.
    ParseFailed { path: PathBuf, message: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved { from, specifier } => {
                write!(f, "cannot resolve '{}' from {}", specifier, from.display())
            }
            Self::ParseFailed { path, message } => {
                write!(f, "skipped {}: {}", path.display(), message)
            }
        }
    }
}

/// Information about a circular import chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The modules in the cycle (the last connects back to the first)
    pub nodes: Vec<PathBuf>,
}

impl CycleInfo {
    /// Formats the cycle with display labels, e.g. "a -> b -> a".
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        let mut labels: Vec<String> = self.nodes.iter().map(|p| display_label(p)).collect();
        labels.push(display_label(first));
        labels.join(" -> ")
    }

    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The import graph discovered from a single entry file.
///
/// The entry node is created with the graph, so it is always present.
///
/// # Example
///
/// ```rust
/// use treepic::graph::{ModuleGraph, ModuleNode};
///
/// let mut graph = ModuleGraph::new("/app/index.js");
/// graph.add_module("/app/a.js", 1);
/// graph.add_module("/app/b.js", 1);
///
/// assert!(graph.add_edge("/app/index.js", "/app/a.js"));
/// assert!(graph.add_edge("/app/index.js", "/app/b.js"));
/// assert!(graph.add_edge("/app/index.js", "/app/a.js")); // collapses
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, DependencyEdge>,
    /// Maps canonical paths to node indices for O(1) lookup
    node_indices: HashMap<PathBuf, NodeIndex>,
    entry: NodeIndex,
    diagnostics: Vec<Diagnostic>,
}

impl ModuleGraph {
    /// Creates a graph containing only the entry module.
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        let entry = entry.into();
        let mut graph = DiGraph::new();
        let idx = graph.add_node(ModuleNode::new(entry.clone(), 0));
        let mut node_indices = HashMap::new();
        node_indices.insert(entry, idx);

        Self {
            graph,
            node_indices,
            entry: idx,
            diagnostics: Vec::new(),
        }
    }

    /// The entry module.
    pub fn entry(&self) -> &ModuleNode {
        &self.graph[self.entry]
    }

    /// Adds a module, or returns the existing index if the path is known.
    pub fn add_module(&mut self, path: impl AsRef<Path>, depth: usize) -> NodeIndex {
        let path = path.as_ref();
        if let Some(&idx) = self.node_indices.get(path) {
            return idx;
        }

        let idx = self.graph.add_node(ModuleNode::new(path, depth));
        self.node_indices.insert(path.to_path_buf(), idx);
        idx
    }

    /// Adds an edge `from -> to`. Both modules must already exist.
    ///
    /// Returns `false` if either endpoint is missing. Adding an existing edge
    /// bumps its `import_count` instead of creating a second edge.
    pub fn add_edge(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (
            self.node_indices.get(from.as_ref()),
            self.node_indices.get(to.as_ref()),
        ) else {
            return false;
        };

        match self.graph.find_edge(from_idx, to_idx) {
            Some(edge) => self.graph[edge].import_count += 1,
            None => {
                self.graph.add_edge(from_idx, to_idx, DependencyEdge::default());
            }
        }
        true
    }

    /// Gets a module by path.
    pub fn get_node(&self, path: impl AsRef<Path>) -> Option<&ModuleNode> {
        self.node_indices
            .get(path.as_ref())
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Returns true if the module is in the graph.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.node_indices.contains_key(path.as_ref())
    }

    /// Modules imported by `path`, sorted by path.
    pub fn imports_of(&self, path: impl AsRef<Path>) -> Vec<&ModuleNode> {
        self.neighbors(path.as_ref(), Direction::Outgoing)
    }

    /// Modules that import `path`, sorted by path.
    pub fn importers_of(&self, path: impl AsRef<Path>) -> Vec<&ModuleNode> {
        self.neighbors(path.as_ref(), Direction::Incoming)
    }

    fn neighbors(&self, path: &Path, direction: Direction) -> Vec<&ModuleNode> {
        let Some(&idx) = self.node_indices.get(path) else {
            return Vec::new();
        };

        let mut nodes: Vec<&ModuleNode> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n])
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes.dedup_by(|a, b| a.path == b.path);
        nodes
    }

    /// All modules, sorted by path.
    pub fn modules(&self) -> Vec<&ModuleNode> {
        let mut nodes: Vec<&ModuleNode> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// All edges as `(from, to, edge)`, sorted by `(from, to)` path.
    pub fn edges(&self) -> Vec<(&ModuleNode, &ModuleNode, &DependencyEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
            .collect();
        edges.sort_by(|a, b| (&a.0.path, &a.1.path).cmp(&(&b.0.path, &b.1.path)));
        edges
    }

    /// Modules at the given depth, sorted by path.
    pub fn get_nodes_at_depth(&self, depth: usize) -> Vec<&ModuleNode> {
        let mut nodes: Vec<&ModuleNode> = self
            .graph
            .node_weights()
            .filter(|n| n.depth == depth)
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// Deepest depth of any module.
    pub fn max_depth(&self) -> usize {
        self.graph.node_weights().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Checks if any import chain leads back to itself.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns every circular import chain.
    ///
    /// Each strongly connected component with more than one module, or a
    /// module importing itself, is reported once. Modules within a cycle are
    /// sorted by path, and cycles are sorted by their first module.
    ///
    /// ```rust
    /// use treepic::graph::ModuleGraph;
    ///
    /// let mut graph = ModuleGraph::new("/a.js");
    /// graph.add_module("/b.js", 1);
    /// graph.add_edge("/a.js", "/b.js");
    /// graph.add_edge("/b.js", "/a.js");
    ///
    /// let cycles = graph.detect_cycles();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].cycle_path(), "a -> b -> a");
    /// ```
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let mut cycles: Vec<CycleInfo> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut nodes: Vec<PathBuf> =
                    scc.iter().map(|&idx| self.graph[idx].path.clone()).collect();
                nodes.sort();
                CycleInfo { nodes }
            })
            .collect();
        cycles.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        cycles
    }

    /// Paths of all modules that take part in a cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<PathBuf> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }

    /// Records a soft failure.
    pub fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Soft failures in the order they were recorded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the number of modules.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node and edge sets as plain paths, for comparing two builds.
    pub fn path_sets(&self) -> (HashSet<PathBuf>, HashSet<(PathBuf, PathBuf)>) {
        let nodes = self.node_indices.keys().cloned().collect();
        let edges = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].path.clone(),
                    self.graph[e.target()].path.clone(),
                )
            })
            .collect();
        (nodes, edges)
    }
}
