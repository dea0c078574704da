//! CLI binary entry point for vibesolver-cli

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use vibesolver_export::cli::commands::export::{ExportArgs, handle_export};
#[cfg(feature = "cli")]
use vibesolver_export::cli::logging::init_cli_logger;
#[cfg(feature = "cli")]
use vibesolver_export::{ExportFormat, Orientation, PageSize, Quality};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "vibesolver-cli")]
#[command(about = "Export VibeSolver solutions to PDF, images, data and infrastructure formats")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Export solutions to a file
    Export {
        /// pdf, png, svg, json, yaml, markdown or terraform
        format: ExportFormat,
        /// Solutions file (JSON array, JSON export document or YAML list)
        input: PathBuf,
        /// Export only these solution ids (repeatable)
        #[arg(short, long = "solution")]
        solutions: Vec<String>,
        /// Solution whose architecture diagram image formats capture
        #[arg(long)]
        diagram: Option<String>,
        /// Output directory (default from config, else current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
        /// PDF page size: A4, letter or legal
        #[arg(long)]
        page_size: Option<PageSize>,
        /// PDF orientation: portrait or landscape
        #[arg(long)]
        orientation: Option<Orientation>,
        /// PNG quality: low, medium or high
        #[arg(long)]
        quality: Option<Quality>,
        /// Omit the details section (PDF)
        #[arg(long)]
        no_details: bool,
        /// Omit recommendations (PDF)
        #[arg(long)]
        no_recommendations: bool,
        /// Omit the architecture section (PDF)
        #[arg(long)]
        no_architecture: bool,
        /// Omit the cost analysis section (PDF)
        #[arg(long)]
        no_cost_analysis: bool,
        /// Configuration file (default: ./.vibesolver.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let result = match cli.command {
        Commands::Export {
            format,
            input,
            solutions,
            diagram,
            output_dir,
            force,
            page_size,
            orientation,
            quality,
            no_details,
            no_recommendations,
            no_architecture,
            no_cost_analysis,
            config,
        } => {
            let args = ExportArgs {
                format,
                input,
                solution_ids: solutions,
                diagram,
                output_dir,
                force,
                page_size,
                orientation,
                quality,
                no_details,
                no_recommendations,
                no_architecture,
                no_cost_analysis,
                config,
            };
            handle_export(&args).map(|_| ())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
