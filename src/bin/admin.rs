//! CLI administration tool for shortlink.
//!
//! Creates and inspects links and checks the database without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link
//! cargo run --bin admin -- link create https://example.com/page
//!
//! # Create a link that expires
//! cargo run --bin admin -- link create https://example.com/page --expires-at 2030-01-01T00:00:00Z
//!
//! # Show a link
//! cargo run --bin admin -- link show a1B2-c3D4
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`shortlink::config`].

use shortlink::application::LinkCache;
use shortlink::application::services::CreationService;
use shortlink::config::{self, Config};
use shortlink::domain::expiry::ExpiryPolicy;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::PgLinkRepository;
use shortlink::server::{connect_cache, connect_pool};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Destination URL (http or https)
        url: String,

        /// Expiry timestamp in RFC 3339 (e.g. 2030-01-01T00:00:00Z)
        #[arg(short, long)]
        expires_at: Option<DateTime<Utc>>,
    },

    /// Show a link by short key
    Show {
        /// Short key in XXXX-XXXX form
        short_key: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repo: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));

    match action {
        LinkAction::Create { url, expires_at } => {
            create_link(repo, config, url, expires_at).await?;
        }
        LinkAction::Show { short_key } => {
            show_link(repo, config, short_key).await?;
        }
    }

    Ok(())
}

/// Creates a link through the same service the HTTP API uses, so the cache
/// is warmed when Redis is configured.
async fn create_link(
    repo: Arc<dyn LinkRepository>,
    config: &Config,
    url: String,
    expires_at: Option<DateTime<Utc>>,
) -> Result<()> {
    println!("{}", "Create short link".bright_blue().bold());
    println!();

    let cache = LinkCache::new(connect_cache(config).await, config.cache_timeout());
    let service = CreationService::new(
        repo,
        cache,
        ExpiryPolicy::new(config.cache_ttl_seconds),
        config.key_generation_attempts,
        config.db_timeout(),
    );

    let record = service
        .create(&url, expires_at)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    let short_url = format!(
        "{}/{}",
        config.base_url.trim_end_matches('/'),
        record.short_key
    );

    println!("  Key:     {}", record.short_key.bright_yellow().bold());
    println!("  URL:     {}", short_url.cyan());
    println!("  Target:  {}", record.original_url);
    if let Some(expiry) = record.custom_expiry {
        println!("  Expires: {}", expiry.to_rfc3339().bright_black());
    }
    println!();
    println!("{}", "Link created successfully!".green().bold());

    Ok(())
}

/// Prints a stored link with its expiry status.
async fn show_link(
    repo: Arc<dyn LinkRepository>,
    config: &Config,
    short_key: String,
) -> Result<()> {
    let record = repo
        .get(&short_key)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    let policy = ExpiryPolicy::new(config.cache_ttl_seconds);
    let status = if policy.is_active(record.custom_expiry, Utc::now()) {
        "ACTIVE".green()
    } else {
        "EXPIRED".red()
    };

    println!("{}", "Link".bright_blue().bold());
    println!();
    println!("  Key:       {}", record.short_key.cyan());
    println!("  Target:    {}", record.original_url);
    println!("  Status:    {}", status);
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!(
        "  Expires:   {}",
        record
            .custom_expiry
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!(
        "  Last used: {}",
        record
            .last_used
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays link statistics.
///
/// Shows:
/// - Total number of links
/// - Links past their custom expiry
/// - Links never resolved
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let expired_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE custom_expiry <= NOW()")
            .fetch_one(pool)
            .await?;

    let unused_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE last_used IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:       {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Expired:     {}",
        expired_count.to_string().bright_green().bold()
    );
    println!(
        "  Never used:  {}",
        unused_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
