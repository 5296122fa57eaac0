//! Bangumi collection CLI application.

use anyhow::{Context, Result};
use bangumi_collection::{
    CancellationToken, ClientConfig, CollectionClient, CollectionType, Subject, SubjectType,
};
use clap::Parser;
use shared::{Config, LogConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bangumi user id or username
    #[arg(short, long)]
    user: String,

    /// Subject type: book, anime, music, game, real (or its code)
    #[arg(short, long, default_value = "anime")]
    subject_type: SubjectType,

    /// Collection state to fetch, repeatable; all states when omitted
    #[arg(short = 't', long = "collection-type")]
    collection_types: Vec<CollectionType>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Access token, overrides the configured one
    #[arg(long)]
    token: Option<String>,

    /// Print subjects as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut log_config = LogConfig::from_config(&config.logging, "bangumi-collection")
        .with_context(|| format!("Invalid [logging] section in {}", args.config.display()))?;
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Bangumi collection starting");

    let mut client_config = ClientConfig::from(&config.bangumi);
    if let Some(token) = &args.token {
        client_config = client_config.with_access_token(token.as_str());
    }
    let client = CollectionClient::new(client_config).context("Failed to create client")?;

    let collection_types = if args.collection_types.is_empty() {
        CollectionType::ALL.to_vec()
    } else {
        args.collection_types.clone()
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            on_interrupt.cancel();
        }
    });

    let subjects = client
        .fetch_with_cancel(&cancel, &args.user, args.subject_type, &collection_types)
        .await
        .with_context(|| format!("Failed to fetch collections of {}", args.user))?;

    if args.json {
        let output =
            serde_json::to_string_pretty(&subjects).context("Failed to serialize subjects")?;
        println!("{output}");
    } else {
        for subject in &subjects {
            println!("{}", format_line(subject));
        }
        println!();
        println!("{} {} subjects", subjects.len(), args.subject_type);
    }

    info!(subjects = subjects.len(), "Bangumi collection finished");

    Ok(())
}

fn format_line(subject: &Subject) -> String {
    format!(
        "ID: {} | {} | rate: {} | tags: {}",
        subject.id,
        subject.display_name(),
        subject.rate,
        subject.tags.join(", ")
    )
}
