//! Command-line interface for the flattener.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::{read_document_file, ArchiveReader, DirectorySource};
use crate::batch::{run_documents, BatchOptions, BatchReport, CancelToken};
use crate::config::RunConfig;
use crate::document::flatten_document;
use crate::error::{FlattenError, Result};
use crate::sink::TsvSink;
use crate::types::Table;

/// Batch label used when a single file is inspected.
const INSPECT_LABEL: &str = "inspect";

/// mojxml-flatten - Flatten cadastral map XML into delimited tables.
#[derive(Parser)]
#[command(name = "mojxml-flatten")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten every .zip/.xml document of a directory into one table file per entity.
    Convert {
        /// Directory holding the documents
        input_dir: PathBuf,

        /// Label written to every row and used as output file prefix (e.g., 202404)
        batch_label: String,

        /// Directory receiving the table files (created if missing)
        output_dir: PathBuf,

        /// Number of worker threads (default: MOJXML_WORKERS or all cores)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Write the batch report as JSON to this path
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Flatten a single .zip/.xml document and print its row counts.
    Inspect {
        /// Document file
        file: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input_dir,
            batch_label,
            output_dir,
            workers,
            report,
        } => {
            let config = RunConfig::new(input_dir, batch_label, output_dir, workers)?;
            convert_command(&config, report.as_deref())
        }
        Commands::Inspect { file } => inspect_command(&file),
    }
}

/// Execute the convert command.
fn convert_command(config: &RunConfig, report_path: Option<&Path>) -> Result<()> {
    let source = DirectorySource::new(&config.input_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;
    let sink = TsvSink::create(&config.output_dir, &config.batch_label)?;
    let ids = source.list()?;

    println!(
        "{} {} documents from {} as {}",
        style("Flattening").bold(),
        ids.len(),
        style(config.input_dir.display()).cyan(),
        style(&config.batch_label).green()
    );

    let pb = ProgressBar::new(ids.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let options = BatchOptions {
        batch_label: config.batch_label.clone(),
        workers: config.workers,
    };
    let report = match run_documents(&source, &ids, &sink, &options, &CancelToken::new(), |id| {
        pb.set_message(id.to_string());
        pb.inc(1);
    }) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    print_summary(&report);

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("{} {}", style("Report:").green().bold(), path.display());
    }

    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        config.output_dir.display()
    );

    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("  Succeeded: {}", style(report.succeeded).green());
    if !report.failed.is_empty() {
        println!("  Failed: {}", style(report.failed.len()).yellow().bold());
        for failure in &report.failed {
            println!(
                "    {} [{}] {}",
                style(&failure.document_id).yellow(),
                failure.stage,
                failure.message
            );
        }
    }
    if report.cancelled > 0 {
        println!("  Cancelled: {}", report.cancelled);
    }
    for (table, count) in &report.rows {
        println!("  {table}: {count}");
    }
    println!();
}

/// Execute the inspect command.
fn inspect_command(file: &Path) -> Result<()> {
    let document_id = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            FlattenError::InvalidConfig(format!("not a document file: {}", file.display()))
        })?;

    let text = read_document_file(file)?;
    let doc = roxmltree::Document::parse(&text)?;
    let records = flatten_document(&doc, document_id, INSPECT_LABEL)?;

    println!("{} {}", style("Document").bold(), style(document_id).cyan());
    if !records.info.map_name.is_empty() {
        println!("  Map: {}", style(&records.info.map_name).green());
    }
    for table in Table::ALL {
        println!("  {table}: {}", records.row_count(table));
    }

    Ok(())
}
