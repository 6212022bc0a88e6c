//! Landing CMS CLI - content seeding and collection tools.
//!
//! # Usage
//!
//! ```bash
//! # Upsert sections and append features/products from a YAML file
//! lcms seed content.yaml
//!
//! # Same, but replace existing features and products
//! lcms seed content.yaml --replace-collections
//!
//! # Print a collection in display order
//! lcms list features
//!
//! # Move the product at index 3 to the top
//! lcms move products 3 0
//! ```
//!
//! The backend is chosen by the same `STORE_BACKEND` / `BACKEND_*`
//! variables the admin server reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::{CliError, CollectionArg, ListTarget};

#[derive(Parser)]
#[command(name = "lcms")]
#[command(author, version, about = "Landing page CMS tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed content from a YAML file
    Seed {
        /// Path to the seed file
        file: String,

        /// Delete existing features and products before adding
        #[arg(long)]
        replace_collections: bool,
    },
    /// Print sections or a collection in display order
    List {
        #[arg(value_enum)]
        target: ListTarget,
    },
    /// Move one item of a collection to a new index (0-based)
    Move {
        #[arg(value_enum)]
        collection: CollectionArg,
        from: usize,
        to: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Seed {
            file,
            replace_collections,
        } => commands::seed::run(&file, replace_collections).await,
        Commands::List { target } => commands::list::run(target).await,
        Commands::Move {
            collection,
            from,
            to,
        } => commands::reorder::run(collection, from, to).await,
    }
}
