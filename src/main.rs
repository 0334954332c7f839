use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod data;
mod models;
mod report;
mod summary;

#[derive(Parser)]
#[command(name = "absence-notice")]
#[command(about = "Summarize student absences and draft parent notifications", long_about = None)]
struct Cli {
    /// Absence log CSV with `student_id,missed_on` columns
    #[arg(long, requires = "directory")]
    absences: Option<PathBuf>,
    /// Student directory CSV with `student_id,name,parent_email` columns
    #[arg(long, requires = "absences")]
    directory: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let (records, directory) = match (&cli.absences, &cli.directory) {
        (Some(absences), Some(directory)) => {
            info!(absences = %absences.display(), directory = %directory.display(), "loading CSV input");
            (data::load_absences(absences)?, data::load_directory(directory)?)
        }
        _ => {
            info!("no input files given, using built-in sample data");
            (data::sample_absences()?, data::sample_directory())
        }
    };
    info!(
        records = records.len(),
        students = directory.len(),
        "input loaded"
    );

    let summaries = summary::summarize(&records, &directory)?;
    info!(students = summaries.len(), "absence summaries computed");

    match cli.format {
        OutputFormat::Table => print!("{}", report::build_report(&summaries)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("failed to serialize summaries")?;
            println!("{json}");
        }
    }

    Ok(())
}
