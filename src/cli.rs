//! # Command Line Interface
//!
//! `serve` (the default) runs the site; the database commands manage the
//! PostgreSQL schema.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::observability::{init_logging, init_observability, log_config_info};
use crate::storage::{
    create_pool, list_applied_migrations, run_migrations, validate_migrations, MigrationInfo,
    Repositories,
};
use crate::web::{start_server, AppState};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "dealership")]
#[command(about = "Car dealership web application")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database URL override
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Apply pending migrations
    Migrate {
        /// Only report whether migrations are pending
        #[arg(long)]
        dry_run: bool,
    },

    /// List applied migrations
    Migrations,
}

/// Parse arguments and run the selected command.
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    match cli.command.unwrap_or(Commands::Serve { port: None, host: None }) {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            serve(config).await
        }
        Commands::Migrate { dry_run } => migrate(config, dry_run).await,
        Commands::Migrations => list_migrations(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let metrics = init_observability(&config.observability).await?;
    tracing::info!(app_name = APP_NAME, version = VERSION, "Starting dealership site");
    log_config_info(&config);

    let repositories = Repositories::connect(&config.database).await?;
    let state = AppState::new(config, repositories, metrics)?;
    start_server(state).await?;
    Ok(())
}

async fn migrate(mut config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    init_logging(&config.observability)?;
    if !config.database.is_postgresql() {
        bail!("migrations require a PostgreSQL database URL");
    }
    config.database.auto_migrate = false;
    let pool = create_pool(&config.database).await?;

    if dry_run {
        if validate_migrations(&pool).await? {
            println!("Database schema is up to date");
        } else {
            println!("Database schema has pending migrations");
        }
        return Ok(());
    }

    println!("Running database migrations...");
    run_migrations(&pool).await?;
    println!("Migrations completed successfully!");
    Ok(())
}

async fn list_migrations(mut config: AppConfig) -> anyhow::Result<()> {
    init_logging(&config.observability)?;
    if !config.database.is_postgresql() {
        bail!("migrations require a PostgreSQL database URL");
    }
    config.database.auto_migrate = false;
    let pool = create_pool(&config.database).await?;

    let migrations = list_applied_migrations(&pool).await?;
    if migrations.is_empty() {
        println!("No migrations have been applied");
    } else {
        print_migrations_table(&migrations);
    }
    Ok(())
}

fn print_migrations_table(migrations: &[MigrationInfo]) {
    println!("{:<16} {:<44} {:<20} {:>10}", "Version", "Description", "Applied On", "Time (ms)");
    println!("{}", "-".repeat(93));
    for migration in migrations {
        println!(
            "{:<16} {:<44} {:<20} {:>10}",
            migration.version,
            migration.description,
            migration.installed_on.format("%Y-%m-%d %H:%M:%S"),
            migration.execution_time
        );
    }
}
