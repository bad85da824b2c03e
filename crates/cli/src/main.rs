use std::sync::Arc;

use anyhow::Context;
use bookshelf_classify::ClassifyClient;
use bookshelf_db::{BookStore, SqliteBookStore};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Search OCLC Classify and manage the local shelf
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Search Classify by title and print the matches as JSON
    Search {
        title: String,
    },
    /// Look up one work by owi and print its classification as JSON
    Lookup {
        owi: String,
    },
    /// Print the shelved books as JSON
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "bookshelf-cli starting");

    match cli.command {
        Command::Serve => bookshelf_app::serve(settings).await,
        Command::Migrate => {
            let (store, classify) = open(&settings)?;
            let registry = bookshelf_app::build_registry(store.clone(), classify);
            let applied = bookshelf_app::migrate(&store, &registry).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Search { title } => {
            let classify = ClassifyClient::new(&settings.classify)?;
            let results = classify.search(&title).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Lookup { owi } => {
            let classify = ClassifyClient::new(&settings.classify)?;
            let lookup = classify.lookup(&owi).await?;
            println!("{}", serde_json::to_string_pretty(&lookup)?);
            Ok(())
        }
        Command::List => {
            let (store, _) = open(&settings)?;
            let books = store.list_books().await?;
            println!("{}", serde_json::to_string_pretty(&books)?);
            Ok(())
        }
    }
}

fn open(settings: &Settings) -> anyhow::Result<(Arc<SqliteBookStore>, ClassifyClient)> {
    let store = SqliteBookStore::open(&settings.database)
        .with_context(|| format!("failed to open database '{}'", settings.database.path))?;
    let classify = ClassifyClient::new(&settings.classify)?;
    Ok((Arc::new(store), classify))
}
