//! End-to-end tests for the `tree_pic` entry points.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use treepic::render::{GraphvizRenderer, RenderError, RenderResult, Renderer};
use treepic::{tree_pic, tree_pic_with, TreePicError, TreePicOptions};

/// Writes the DOT text as the "image" and remembers it.
#[derive(Default)]
struct RecordingRenderer {
    dot: Mutex<Option<String>>,
}

#[async_trait]
impl Renderer for RecordingRenderer {
    fn check_available(&self) -> RenderResult<()> {
        Ok(())
    }

    async fn render(&self, dot: &str, output: &Path) -> RenderResult<PathBuf> {
        fs::write(output, dot)?;
        *self.dot.lock().unwrap() = Some(dot.to_string());
        Ok(output.to_path_buf())
    }
}

struct MissingRenderer;

#[async_trait]
impl Renderer for MissingRenderer {
    fn check_available(&self) -> RenderResult<()> {
        Err(RenderError::BinaryNotFound {
            binary: "dot".to_string(),
        })
    }

    async fn render(&self, _dot: &str, _output: &Path) -> RenderResult<PathBuf> {
        panic!("render called on an unavailable renderer");
    }
}

/// index.js -> a.js, b.ts; a.js -> b.ts; b.ts -> a.js (cycle);
/// index.js also imports a package and a missing file.
fn es6_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(
        root.join("index.js"),
        "import a from './a';\nimport { b } from './b';\nimport React from 'react';\nimport gone from './gone';\n",
    )
    .unwrap();
    fs::write(root.join("a.js"), "const b = require('./b');\nmodule.exports = b;\n").unwrap();
    fs::write(root.join("b.ts"), "export * from './a';\nexport const b: number = 1;\n").unwrap();
    dir
}

#[tokio::test]
async fn rejects_missing_filename() {
    let project = es6_project();
    let err = tree_pic(TreePicOptions::new().directory(project.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, TreePicError::MissingArgument(_)));
    assert_eq!(err.to_string(), "filename not provided");
}

#[tokio::test]
async fn rejects_missing_directory() {
    let project = es6_project();
    let err = tree_pic(TreePicOptions::new().filename(project.path().join("index.js")))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "directory not provided");
}

#[tokio::test]
async fn rejects_when_graphviz_is_missing() {
    let project = es6_project();
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path());

    let err = tree_pic_with(options, &MissingRenderer).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Graphviz could not be found. Ensure that \"dot\" is in your $PATH."
    );
    assert!(!project.path().join("Tree_for_index.png").exists());
}

#[tokio::test]
async fn rejects_when_binary_not_on_search_path() {
    let project = es6_project();
    let empty = TempDir::new().unwrap();
    let renderer = GraphvizRenderer::new().with_search_path(empty.path());
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path());

    let err = tree_pic_with(options, &renderer).await.unwrap_err();

    assert!(matches!(
        err,
        TreePicError::Render(RenderError::BinaryNotFound { .. })
    ));
}

#[tokio::test]
async fn returns_default_image_path() {
    let project = es6_project();
    let renderer = RecordingRenderer::default();
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path());

    let image = tree_pic_with(options, &renderer).await.unwrap();

    assert_eq!(image, project.path().join("Tree_for_index.png"));
    assert!(image.exists());
}

#[tokio::test]
async fn uses_given_image_path() {
    let project = es6_project();
    let out = TempDir::new().unwrap();
    let desired = out.path().join("sweetImage.png");
    let renderer = RecordingRenderer::default();
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path())
        .image_path(&desired);

    let image = tree_pic_with(options, &renderer).await.unwrap();

    assert_eq!(image, desired);
    assert!(!project.path().join("Tree_for_index.png").exists());
}

#[tokio::test]
async fn dot_contains_local_modules_only() {
    let project = es6_project();
    let root = project.path().canonicalize().unwrap();
    let renderer = RecordingRenderer::default();
    let options = TreePicOptions::new()
        .filename("index.js")
        .directory(project.path());

    tree_pic_with(options, &renderer).await.unwrap();
    let dot = renderer.dot.lock().unwrap().clone().unwrap();

    let id = |name: &str| format!("\"{}\"", root.join(name).display());
    assert!(dot.starts_with("digraph \"index\" {"));
    assert!(dot.contains(&format!("{} -> {};", id("index.js"), id("a.js"))));
    assert!(dot.contains(&format!("{} -> {};", id("index.js"), id("b.ts"))));
    assert!(dot.contains(&format!("{} -> {};", id("a.js"), id("b.ts"))));
    assert!(dot.contains(&format!("{} -> {};", id("b.ts"), id("a.js"))));
    assert!(!dot.contains("react"));
    assert!(!dot.contains("gone"));
    assert_eq!(dot.matches(" -> ").count(), 4);
}

#[tokio::test]
async fn dependency_graph_reports_cycle_and_unresolved() {
    let project = es6_project();
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path());

    let graph = treepic::dependency_graph(&options).await.unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.has_cycles());
    assert_eq!(graph.diagnostics().len(), 1);
}

#[tokio::test]
async fn renders_with_real_graphviz() {
    if GraphvizRenderer::new().locate().is_none() {
        eprintln!("skipping: graphviz not installed");
        return;
    }
    let project = es6_project();
    let options = TreePicOptions::new()
        .filename(project.path().join("index.js"))
        .directory(project.path());

    let image = tree_pic(options).await.unwrap();

    let bytes = fs::read(&image).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}
