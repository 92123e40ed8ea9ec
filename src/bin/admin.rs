//! CLI administration tool for linkcrush.
//!
//! Inspects and creates links and checks the database without going through
//! the HTTP API. Link commands use the same cache-aside path as the server,
//! so a link created here is cached exactly like one created over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link
//! cargo run --bin admin -- link create https://example.com/page
//!
//! # Show a link with its access count
//! cargo run --bin admin -- link show Xk3p9QaZ
//!
//! # View totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `linkcrush::config`); at least `DATABASE_URL` or
//! the `DB_*` components.

use linkcrush::application::access_worker;
use linkcrush::application::services::{LinkService, LinkStore};
use linkcrush::config::{self, Config};
use linkcrush::domain::entities::Link;
use linkcrush::infrastructure::persistence::PgLinkRepository;
use linkcrush::server::{build_cache, connect_database};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkcrush.
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
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link for a URL
    Create {
        /// URL to shorten (stored as given)
        url: String,
    },

    /// Show a link and its access count
    Show {
        /// Short code
        code: String,
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
    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link commands through the same service the server uses.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let cache = build_cache(config).await;
    let store = Arc::new(LinkStore::new(repository, cache, config.store_settings()));

    // Neither command records accesses; the receiver only keeps the queue open.
    let (recorder, _access_rx) = access_worker::channel(1);
    let service = LinkService::new(store, recorder, config.max_code_attempts);

    match action {
        LinkAction::Create { url } => {
            println!("{}", "✨ Create short link".bright_blue().bold());
            println!();

            let link = service
                .create(&url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

            print_link(&link);
            println!("{}", "✅ Link created successfully!".green().bold());
            println!();
        }
        LinkAction::Show { code } => {
            println!("{}", "🔗 Short link".bright_blue().bold());
            println!();

            let link = service
                .stats(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load link {}: {}", code, e))?;

            print_link(&link);
        }
    }

    Ok(())
}

fn print_link(link: &Link) {
    println!("  ID:       {}", link.id.bright_black());
    println!("  Code:     {}", link.short_code.bright_yellow().bold());
    println!("  URL:      {}", link.url.cyan());
    println!(
        "  Accesses: {}",
        link.access_count.to_string().bright_green().bold()
    );
    println!();
}

/// Displays totals across all links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let access_total: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(access_count), 0)::BIGINT FROM urls")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:    {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Accesses: {}",
        access_total.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
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
