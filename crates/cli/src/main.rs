mod commands;

use clap::{Parser, Subcommand};
use commands::update;
use silt_core::SiltError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "silt")]
#[command(about = "Per-directory SQL generation for ordered database changelogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate update SQL, one file per changelog source directory
    Update {
        /// Master changelog file
        #[arg(long, default_value = "changelog.yaml")]
        changelog: String,

        /// Root directory SQL files are written under; when empty the
        /// command does nothing
        #[arg(long, default_value = "")]
        output_directory: String,

        /// Source root whose final path segment becomes the module segment
        /// of every output path
        #[arg(long, default_value = "")]
        source_directory: String,

        /// File name created in each output directory
        #[arg(long, default_value = "update.sql")]
        output_file: String,

        /// Text encoding of generated files
        #[arg(long, default_value = "UTF-8")]
        output_encoding: String,

        /// Comma-separated context expressions
        #[arg(long)]
        contexts: Option<String>,

        /// Comma-separated label expressions
        #[arg(long)]
        labels: Option<String>,

        /// Accepted for compatibility; ignored by SQL generation
        #[arg(long)]
        drop_first: bool,

        /// Accepted for compatibility; ignored by SQL generation
        #[arg(long)]
        to_tag: Option<String>,

        /// Database name recorded in generated file headers
        #[arg(long, default_value = "offline")]
        database: String,
    },
}

fn main() -> Result<(), SiltError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Update {
            changelog,
            output_directory,
            source_directory,
            output_file,
            output_encoding,
            contexts,
            labels,
            drop_first,
            to_tag,
            database,
        } => update::run(update::UpdateArgs {
            changelog,
            output_directory,
            source_directory,
            output_file,
            output_encoding,
            contexts,
            labels,
            drop_first,
            to_tag,
            database,
        }),
    }
}
