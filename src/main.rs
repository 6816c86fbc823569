use std::{path::Path, sync::Arc};

use chrono::Utc;
use clap::Parser;

mod config;
mod db;
mod models;
mod observability;
mod retention;

use retention::RunLog;

/// CLI arguments for the CRM retention service
#[derive(Parser, Debug)]
#[command(version, about = "CRM customer retention service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "crm-retention.toml")]
    config: String,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run a single retention pass and exit (default)
    ///
    /// This is the cron entry point: one pass, one run-log line, and an
    /// exit code reflecting whether the pass actually succeeded.
    Run,
    /// Run the periodic retention worker until terminated
    Worker,
    /// Run database migrations and exit
    ///
    /// Useful for init containers or CI/CD pipelines. Connects to the
    /// database, runs any pending migrations, and exits.
    Migrate,
    /// Initialize a new configuration file
    Init {
        /// Path to create the config file (defaults to crm-retention.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Default configuration for getting started.
fn default_config_toml() -> &'static str {
    r#"# CRM retention service configuration

# The CRM database holding the customer records
[database]
type = "sqlite"
path = "/var/lib/crm/crm.db"

# Customers whose last order is older than inactive_days are deleted
[retention]
inactive_days = 365
interval_hours = 24

[retention.safety]
dry_run = false
batch_size = 1000
max_deletes_per_run = 100000

# Plain-text audit trail: one line per pass
[run_log]
path = "/var/log/crm-retention.log"

[logging]
level = "info"
format = "compact"
"#
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => {
            run_init(output, force);
        }
        Some(Command::Migrate) => {
            run_migrate(&args.config).await;
        }
        Some(Command::Worker) => {
            run_worker(&args.config).await;
        }
        Some(Command::Run) | None => {
            run_once(&args.config).await;
        }
    }
}

/// Initialize a new configuration file
fn run_init(output: Option<String>, force: bool) {
    let path = output.unwrap_or_else(|| "crm-retention.toml".to_string());

    if Path::new(&path).exists() && !force {
        eprintln!(
            "Error: Config file already exists at {} (use --force to overwrite)",
            path
        );
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&path, default_config_toml()) {
        eprintln!("Error: Failed to write config file {}: {}", path, e);
        std::process::exit(1);
    }

    println!("Created config file at {}", path);
}

fn load_config(path: &str) -> config::ServiceConfig {
    match config::ServiceConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Run database migrations and exit
async fn run_migrate(config_path: &str) {
    let config = load_config(config_path);

    observability::init_tracing(&config.logging).expect("Failed to initialize tracing");

    tracing::info!(config_file = %config_path, "Running database migrations");

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!("Database migrations completed successfully");
                std::process::exit(0);
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a single retention pass, record it in the run log, and exit with an
/// honest status code.
async fn run_once(config_path: &str) {
    let config = load_config(config_path);

    observability::init_tracing(&config.logging).expect("Failed to initialize tracing");

    let run_log = RunLog::from_config(&config.run_log);
    let now = Utc::now();

    // The run log receives an entry on failure too, so the file alone
    // tells the whole history of the job.
    let pool = match connect_and_migrate(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Retention pass failed");
            if let Some(log) = &run_log
                && let Err(io_err) = log.record_failure(now, &e.to_string())
            {
                tracing::error!(error = %io_err, path = %log.path().display(), "Failed to write run log");
            }
            eprintln!("Error: Retention pass failed: {}", e);
            std::process::exit(1);
        }
    };

    match retention::run_recorded(&pool, &config.retention, run_log.as_ref(), now).await {
        Ok(result) => {
            tracing::info!(
                deleted = result.customers_deleted,
                cutoff = %result.cutoff,
                dry_run = result.dry_run,
                "Retention pass complete"
            );
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "Retention pass failed");
            eprintln!("Error: Retention pass failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Connect and run migrations if configured.
async fn connect_and_migrate(config: &config::ServiceConfig) -> Result<db::DbPool, db::DbError> {
    let pool = db::DbPool::from_config(&config.database).await?;

    if config.database.run_migrations() {
        pool.run_migrations().await?;
    }

    Ok(pool)
}

/// Run the periodic retention worker until terminated
async fn run_worker(config_path: &str) {
    let config = load_config(config_path);

    observability::init_tracing(&config.logging).expect("Failed to initialize tracing");

    let pool = match db::DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.health_check().await {
        tracing::error!(error = %e, "Database health check failed");
        eprintln!("Error: Database health check failed: {}", e);
        std::process::exit(1);
    }

    if config.database.run_migrations()
        && let Err(e) = pool.run_migrations().await
    {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }

    let run_log = RunLog::from_config(&config.run_log);
    let db = Arc::new(pool);

    tokio::select! {
        () = retention::start_retention_worker(db, config.retention, run_log) => {
            // Worker only returns when the policy is disabled
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping retention worker");
        }
    }
}
