//! Graph module for import relationship modeling.
//!
//! [`ModuleGraph`] holds the modules and "imports" edges found from one entry
//! file; [`GraphBuilder`] discovers them.
//!
//! # Example
//!
//! ```rust
//! use treepic::graph::ModuleGraph;
//!
//! let mut graph = ModuleGraph::new("/app/index.js");
//! graph.add_module("/app/util.js", 1);
//! graph.add_edge("/app/index.js", "/app/util.js");
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod builder;
mod module_graph;

pub use builder::{default_concurrency, GraphBuilder, GraphError, GraphResult, MAX_CONCURRENCY};
pub use module_graph::{
    display_label, CycleInfo, DependencyEdge, Diagnostic, ModuleGraph, ModuleNode,
};
