mod commands;
mod diagnostics;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "citescan", about = "Find passage citations in free text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every recognized book spelling
    Aliases {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Validate a corpus file and its alias table
    Check {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Print the citations found in files, directories, or stdin
    Scan(ScanArgs),
}

/// Where the corpus comes from and how its aliases are indexed.
#[derive(Args)]
pub struct CorpusArgs {
    /// Corpus definition (TOML)
    #[arg(long, short)]
    pub config: PathBuf,
    /// Let a later book take over an alias claimed twice instead of failing
    #[arg(long)]
    pub loose: bool,
    /// Leave two-letter extra aliases out of the table
    #[arg(long)]
    pub no_short_aliases: bool,
}

#[allow(clippy::struct_excessive_bools, reason = "each flag is one CLI switch")]
#[derive(Args)]
pub struct ScanArgs {
    /// Report book names that stand alone as whole-book citations
    #[arg(long)]
    pub books: bool,
    /// Print each citation in its minimal combined form
    #[arg(long)]
    pub combine: bool,
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// One JSON object per line
    #[arg(long)]
    pub json: bool,
    /// Ignore references without a book name
    #[arg(long)]
    pub no_context: bool,
    /// Files or directories to scan (`.md` and `.txt`); stdin when empty
    pub paths: Vec<PathBuf>,
    /// Also report references that do not resolve
    #[arg(long)]
    pub unresolved: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Aliases { corpus } => commands::aliases(&corpus),
        Commands::Check { corpus } => commands::check(&corpus),
        Commands::Scan(args) => commands::scan(&args),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
