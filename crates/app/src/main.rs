//! Forno operator CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use forno_app::{
    database,
    domain::events::{EventProducer, PgNotifyProducer},
};

#[derive(Debug, Parser)]
#[command(name = "forno-app", about = "Forno CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, default_value = "")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Publish a message on an event topic
    Publish(PublishArgs),
}

#[derive(Debug, Args)]
struct PublishArgs {
    /// Topic to publish on, e.g. `product`
    #[arg(long)]
    topic: String,

    /// Message payload, usually JSON
    #[arg(long)]
    message: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if cli.database_url.trim().is_empty() {
        return Err("DATABASE_URL must be set".to_string());
    }

    let pool = database::connect(&cli.database_url, 1)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match cli.command {
        Commands::Migrate => {
            database::migrate(&pool)
                .await
                .map_err(|error| format!("failed to run migrations: {error}"))?;

            println!("migrations applied");
        }
        Commands::Publish(args) => {
            PgNotifyProducer::new(pool)
                .send(args.topic.clone(), args.message)
                .await
                .map_err(|error| format!("failed to publish message: {error}"))?;

            println!("published on {}", args.topic);
        }
    }

    Ok(())
}
