use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use treepic::export::{export, ExportFormat};
use treepic::graph::default_concurrency;
use treepic::logger::init_logger;
use treepic::TreePicOptions;

#[derive(Parser)]
#[command(name = "treepic")]
#[command(version)]
#[command(about = "Render the local import graph of a JavaScript/TypeScript module with Graphviz", long_about = None)]
struct Cli {
    /// Entry module
    #[arg(env = "TREEPIC_FILE")]
    file: PathBuf,

    /// Base directory for the default image (defaults to the current directory)
    #[arg(short, long, env = "TREEPIC_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Output image path (defaults to <DIRECTORY>/Tree_for_<stem>.png)
    #[arg(short, long, env = "TREEPIC_OUTPUT")]
    output: Option<PathBuf>,

    /// Files scanned concurrently
    #[arg(short = 'j', long, env = "TREEPIC_JOBS", default_value_t = default_concurrency())]
    jobs: usize,

    /// Do not follow imports past this depth
    #[arg(long, env = "TREEPIC_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// Render an image, or print the graph to stdout
    #[arg(long, value_enum, default_value_t = Format::Png, env = "TREEPIC_FORMAT")]
    format: Format,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Dot,
    Json,
    Tree,
}

impl Format {
    fn export_format(self) -> Option<ExportFormat> {
        match self {
            Format::Png => None,
            Format::Dot => Some(ExportFormat::Dot),
            Format::Json => Some(ExportFormat::Json),
            Format::Tree => Some(ExportFormat::Tree),
        }
    }
}

impl Cli {
    fn options(&self) -> Result<TreePicOptions> {
        let cwd = std::env::current_dir().context("Failed to read the current directory")?;
        let mut options = TreePicOptions::new()
            .filename(cwd.join(&self.file))
            .directory(cwd.join(self.directory.as_deref().unwrap_or(&cwd)))
            .max_concurrency(self.jobs)
            .max_depth(self.max_depth);
        if let Some(output) = &self.output {
            options = options.image_path(cwd.join(output));
        }
        Ok(options)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli.options()?;

    match cli.format.export_format() {
        None => {
            let image = treepic::tree_pic(options).await?;
            println!("{}", image.display());
        }
        Some(format) => {
            let graph = treepic::dependency_graph(&options).await?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            export(format, &graph, &mut out).context("Failed to write graph to stdout")?;
            out.flush()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet, cli.no_color);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
