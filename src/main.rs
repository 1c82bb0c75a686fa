use clap::{Parser, Subcommand};
use resume_polish::Result;
use resume_polish::commands::{build, rewrite, search, show_config};
use resume_polish::config::{Config, get_config_dir};
use resume_polish::generation::DEFAULT_TOP_K;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-polish")]
#[command(about = "A retrieval-augmented resume rewriting tool for SDR resumes")]
#[command(version)]
struct Cli {
    /// Override the configuration directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Pair before/after documents, embed them, and persist the index
    Build {
        /// Write a human-readable dump of every record to this path
        #[arg(long)]
        dump: Option<PathBuf>,
    },
    /// Show the stored examples nearest to a resume (debugging aid)
    Search {
        /// Resume file to search with, or `-` for stdin
        input: String,
        /// Number of examples to show
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },
    /// Rewrite a resume using the built corpus
    Rewrite {
        /// Resume file to rewrite, or `-` for stdin
        input: String,
        /// Number of retrieved examples to include in the prompt
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Write the rewritten resume here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };
    let config = Config::load(&config_dir)?;

    match cli.command {
        Commands::Config { show: _ } => {
            show_config(&config, &config_dir)?;
        }
        Commands::Build { dump } => {
            build(&config, dump.as_deref())?;
        }
        Commands::Search { input, k } => {
            search(&config, &input, k)?;
        }
        Commands::Rewrite { input, k, output } => {
            rewrite(&config, &input, k, output.as_deref())?;
        }
    }

    Ok(())
}
