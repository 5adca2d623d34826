use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treeloom::ai::ModelId;
use treeloom::cli::commands::generate::{ExportFormat, GenerateOptions};

#[derive(Parser)]
#[command(name = "treeloom")]
#[command(
    version,
    about = "LLM-powered knowledge tree builder for notes and documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a knowledge tree from notes and documents
    Generate {
        /// Note text; repeat for several notes, lines split into fragments
        #[arg(long, short = 'n')]
        note: Vec<String>,

        /// File of notes, one fragment per non-blank line
        #[arg(long)]
        notes_file: Option<PathBuf>,

        /// Documents to ingest (txt, md, pdf, doc, docx)
        #[arg(value_name = "DOCUMENT")]
        documents: Vec<PathBuf>,

        /// Outline nudging the model's organization of output
        #[arg(long, short = 's')]
        structure: Option<String>,

        /// File containing the structure outline
        #[arg(long)]
        structure_file: Option<PathBuf>,

        /// Model to use (gpt-4o, gemini-2.0-flash)
        #[arg(long, short = 'm')]
        model: Option<ModelId>,

        /// Export format
        #[arg(long, short = 'f', value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file; stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Output as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize the global config")]
        global: bool,
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mtreeloom encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            note,
            notes_file,
            documents,
            structure,
            structure_file,
            model,
            format,
            output,
        } => {
            treeloom::cli::commands::generate::run(GenerateOptions {
                notes: note,
                notes_file,
                documents,
                structure,
                structure_file,
                model,
                format,
                output,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                treeloom::cli::commands::config::show(json)?;
            }
            ConfigAction::Path => {
                treeloom::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                treeloom::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
