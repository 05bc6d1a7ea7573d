mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ctxstore",
    about = "Log-structured session-metadata store — snapshot, delta journal, compaction",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .ctxstore/ or .git/)
    #[arg(long, global = true, env = "CTXSTORE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store in the current project
    Init,

    /// Show journal length and which snapshot representations exist
    Status,

    /// Load the current metadata (base snapshot with pending deltas folded in)
    Show,

    /// Record one update as a journal delta
    Update {
        /// Dot-delimited field path (e.g. essential.lastSession)
        field: String,
        /// Value, parsed as JSON with plain-string fallback
        value: String,
        /// Operation: set, add, or remove
        #[arg(long, default_value = "set")]
        op: String,
    },

    /// Fold the journal into a new snapshot and truncate it
    Compact,

    /// Validate the persisted snapshot, repairing it if damaged
    Check,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Show => cmd::show::run(&root, cli.json),
        Commands::Update { field, value, op } => cmd::update::run(&root, &field, &value, &op),
        Commands::Compact => cmd::compact::run(&root, cli.json),
        Commands::Check => cmd::check::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
