//! Import graph traversal.
//!
//! [`GraphBuilder`] walks outward from an entry file one breadth-first level
//! at a time. Within a level, files are read, parsed and resolved in parallel
//! tasks bounded by a semaphore. Tasks only return [`FileScan`] values; the
//! coordinating loop is the single owner of the visited set and the graph,
//! so first-discovery checks are never raced.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info, instrument, trace, warn};

use super::module_graph::{Diagnostic, ModuleGraph};
use crate::analysis::{AnalysisError, AnalysisResult, ImportAnalyzer, SourceLanguage};
use crate::resolve::{ModuleResolver, Resolution};

/// Upper bound applied to any requested concurrency.
pub const MAX_CONCURRENCY: usize = 64;

/// Errors that abort a graph build.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Entry file not found: {path}")]
    EntryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry is not a file: {0}")]
    EntryNotAFile(PathBuf),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Scan task failed: {0}")]
    Task(#[from] JoinError),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Default number of files scanned at once.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_CONCURRENCY)
}

/// What scanning one file produced.
#[derive(Debug)]
pub struct FileScan {
    pub path: PathBuf,
    pub outcome: ScanOutcome,
}

#[derive(Debug)]
pub enum ScanOutcome {
    /// Not a parseable source file (e.g. `.json`); a leaf in the graph.
    Leaf,
    /// Every specifier found, in source order, with its resolution.
    Imports(Vec<(String, Resolution)>),
    /// The file could not be read or parsed.
    Failed(String),
}

/// Builds a [`ModuleGraph`] from an entry file.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    resolver: Arc<ModuleResolver>,
    max_concurrency: usize,
    max_depth: Option<usize>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(ModuleResolver::new()),
            max_concurrency: default_concurrency(),
            max_depth: None,
        }
    }

    pub fn with_resolver(mut self, resolver: ModuleResolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Number of files scanned at once, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Modules deeper than `max_depth` are not added; modules at it are added
    /// but their imports are not followed.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Traverses the imports reachable from `entry`.
    ///
    /// Unresolvable specifiers and unparseable files are recorded as
    /// diagnostics and logged; only a missing entry or a crashed task fails
    /// the build. Dropping the returned future aborts outstanding scans.
    #[instrument(skip(self, entry), fields(entry = %entry.display()))]
    pub async fn build(&self, entry: &Path) -> GraphResult<ModuleGraph> {
        let entry = tokio::fs::canonicalize(entry)
            .await
            .map_err(|source| GraphError::EntryNotFound {
                path: entry.to_path_buf(),
                source,
            })?;
        if !tokio::fs::metadata(&entry)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(GraphError::EntryNotAFile(entry));
        }

        // Fail fast if the grammars cannot be loaded rather than reporting
        // every file as unparseable.
        ImportAnalyzer::new()?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut graph = ModuleGraph::new(entry.clone());
        let mut visited: HashSet<PathBuf> = HashSet::from([entry.clone()]);
        let mut frontier = vec![entry];
        let mut depth = 0;

        while !frontier.is_empty() && self.max_depth.map_or(true, |max| depth < max) {
            debug!(depth, files = frontier.len(), "scanning level");

            let mut tasks = JoinSet::new();
            for path in frontier.drain(..) {
                let semaphore = Arc::clone(&semaphore);
                let resolver = Arc::clone(&self.resolver);
                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    scan_file(path, resolver).await
                });
            }

            let mut scans = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                scans.push(joined?);
            }
            // Apply in path order so depth ties and diagnostics are stable.
            scans.sort_by(|a, b| a.path.cmp(&b.path));

            for scan in scans {
                frontier.extend(apply_scan(&mut graph, &mut visited, scan, depth + 1));
            }
            depth += 1;
        }

        info!(
            modules = graph.node_count(),
            edges = graph.edge_count(),
            diagnostics = graph.diagnostics().len(),
            "import graph built"
        );
        Ok(graph)
    }
}

/// Merges one scan into the graph and returns newly discovered modules.
fn apply_scan(
    graph: &mut ModuleGraph,
    visited: &mut HashSet<PathBuf>,
    scan: FileScan,
    child_depth: usize,
) -> Vec<PathBuf> {
    let FileScan { path, outcome } = scan;
    let mut discovered = Vec::new();

    match outcome {
        ScanOutcome::Leaf => trace!(path = %path.display(), "leaf module"),
        ScanOutcome::Failed(message) => {
            warn!(path = %path.display(), error = %message, "skipping imports of file");
            graph.record_diagnostic(Diagnostic::ParseFailed { path, message });
        }
        ScanOutcome::Imports(imports) => {
            for (specifier, resolution) in imports {
                match resolution {
                    Resolution::Resolved(target) => {
                        if visited.insert(target.clone()) {
                            graph.add_module(&target, child_depth);
                            discovered.push(target.clone());
                        }
                        graph.add_edge(&path, &target);
                    }
                    Resolution::External => {
                        trace!(%specifier, from = %path.display(), "external import dropped");
                    }
                    Resolution::Unresolvable => {
                        warn!(%specifier, from = %path.display(), "unresolvable import");
                        graph.record_diagnostic(Diagnostic::Unresolved {
                            from: path.clone(),
                            specifier,
                        });
                    }
                }
            }
        }
    }

    discovered
}

thread_local! {
    /// One analyzer per blocking-pool thread, reused across scans.
    static ANALYZER: RefCell<Option<ImportAnalyzer>> = const { RefCell::new(None) };
}

/// Runs `f` with this thread's analyzer, creating it on first use.
fn with_thread_analyzer<T>(
    f: impl FnOnce(&mut ImportAnalyzer) -> AnalysisResult<T>,
) -> AnalysisResult<T> {
    ANALYZER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let mut analyzer = match slot.take() {
            Some(analyzer) => analyzer,
            None => ImportAnalyzer::new()?,
        };
        let result = f(&mut analyzer);
        *slot = Some(analyzer);
        result
    })
}

/// Reads, parses and resolves one file.
///
/// Never fails: problems are reported as [`ScanOutcome::Failed`].
pub async fn scan_file(path: PathBuf, resolver: Arc<ModuleResolver>) -> FileScan {
    let Some(language) = SourceLanguage::from_path(&path) else {
        return FileScan {
            path,
            outcome: ScanOutcome::Leaf,
        };
    };

    let source = match tokio::fs::read_to_string(&path).await {
        Ok(source) => source,
        Err(e) => {
            return FileScan {
                outcome: ScanOutcome::Failed(AnalysisError::FileRead(e).to_string()),
                path,
            };
        }
    };

    // Parsing and filesystem probing are blocking work.
    let blocking_path = path.clone();
    let outcome = task::spawn_blocking(move || -> Result<Vec<(String, Resolution)>, AnalysisError> {
        let imports = with_thread_analyzer(|analyzer| {
            analyzer.analyze_source(&source, language, &blocking_path)
        })?;
        let dir = blocking_path.parent().unwrap_or_else(|| Path::new("/"));
        Ok(imports
            .into_iter()
            .map(|import| {
                let resolution = resolver.resolve(&import.source, dir);
                (import.source, resolution)
            })
            .collect())
    })
    .await;

    let outcome = match outcome {
        Ok(Ok(imports)) => {
            debug!(path = %path.display(), imports = imports.len(), "scanned");
            ScanOutcome::Imports(imports)
        }
        Ok(Err(e)) => ScanOutcome::Failed(e.to_string()),
        Err(e) => ScanOutcome::Failed(format!("parser task failed: {e}")),
    };

    FileScan { path, outcome }
}
