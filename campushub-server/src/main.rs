use std::{env, sync::Arc};

use campushub_core::{CampusHub, DatabaseError, DiskPosterStore, PgDatabase};
use campushub_server::{logging, run_server, ServerContext, DEFAULT_PORT};
use colored::Colorize;
use log::{error, info, warn};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
enum StartupError {
    #[error("Missing required environment variable {0}")]
    MissingConfig(&'static str),

    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid public url: {0}")]
    InvalidPublicUrl(String),
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::MissingConfig(name) => {
                format!("Set {name} in the environment, then try again.")
            }
            StartupError::Database(_) => "This is a database error. Make sure the Postgres instance is running and DATABASE_URL points at it, then try again.".to_string(),
            StartupError::InvalidPublicUrl(_) => {
                "CAMPUSHUB_PUBLIC_URL must be an absolute url ending with a slash.".to_string()
            }
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    match bootstrap().await {
        Ok(context) => {
            info!("Initialized successfully.");
            run_server(context).await;
        }
        Err(error) => {
            error!("{}", "CampusHub failed to start!".bold().red());
            error!("{error}");
            error!("{}", format!("Hint: {}", error.hint()).italic());
        }
    }
}

async fn bootstrap() -> Result<ServerContext, StartupError> {
    let database_url =
        env::var("DATABASE_URL").map_err(|_| StartupError::MissingConfig("DATABASE_URL"))?;

    info!("Connecting to database...");

    let database = PgDatabase::new(&database_url).await?;
    database.migrate().await?;

    let poster_dir =
        env::var("CAMPUSHUB_POSTER_DIR").unwrap_or_else(|_| "posters".to_string());
    let public_url = env::var("CAMPUSHUB_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://localhost:{DEFAULT_PORT}/posters/"));
    let public_url =
        Url::parse(&public_url).map_err(|e| StartupError::InvalidPublicUrl(e.to_string()))?;

    let bootstrap_key: Option<Arc<str>> = env::var("CAMPUSHUB_BOOTSTRAP_KEY").ok().map(Arc::from);

    if bootstrap_key.is_some() {
        warn!("Bootstrap override is enabled. Unset CAMPUSHUB_BOOTSTRAP_KEY once an admin account exists.");
    }

    Ok(ServerContext {
        hub: Arc::new(CampusHub::new(database)),
        posters: Arc::new(DiskPosterStore::new(poster_dir, public_url)),
        bootstrap_key,
    })
}
