//! levelcheck CLI — interactive sessions and report tooling.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "levelcheck",
    version,
    about = "Vocabulary and grammar placement assessment"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an assessment interactively
    Take {
        /// Path to a .toml question bank or a directory of banks
        #[arg(long)]
        bank: PathBuf,

        /// Student name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Enable the countdown timer
        #[arg(long)]
        timer: bool,

        /// Seed for the option shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a saved answer sheet
    Grade {
        /// Path to the .toml question bank
        #[arg(long)]
        bank: PathBuf,

        /// Answer sheet JSON
        #[arg(long)]
        answers: PathBuf,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Render a saved report
    Show {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("levelcheck=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            name,
            timer,
            seed,
            output,
            format,
            config,
        } => commands::take::execute(bank, name, timer, seed, output, format, config).await,
        Commands::Grade {
            bank,
            answers,
            output,
            format,
            config,
        } => commands::grade::execute(bank, answers, output, format, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Show { report, format } => commands::show::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
