//! quizmark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Quiz scoring and grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a batch of quiz attempts
    Grade {
        /// Path to the quiz bank .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Submission .json file or directory of them
        #[arg(long)]
        submissions: PathBuf,

        /// Output directory (defaults to output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Max attempts graded concurrently (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two grade reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change in percentage points that counts as a regression
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate quiz bank TOML files
    Validate {
        /// Path to quiz bank file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Show per-question statistics from a grade report
    Stats {
        /// Grade report JSON
        #[arg(long)]
        report: PathBuf,
    },

    /// Create starter config and example quiz bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quizmark=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            submissions,
            output,
            format,
            parallelism,
            config,
        } => {
            commands::grade::execute(quiz, submissions, output, format, parallelism, config).await
        }
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Stats { report } => commands::stats::execute(report),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
