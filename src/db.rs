use deadpool_postgres::{Config, Pool, Runtime};
use log::info;
use std::env;
use tokio_postgres::NoTls;

use crate::errors::PipelineError;

pub type DbPool = Pool;

/// Creates a Deadpool PostgreSQL connection pool from the `DATABASE_URL`
/// environment variable.
pub fn create_pool() -> Result<DbPool, PipelineError> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| PipelineError::Config("DATABASE_URL environment variable not set".to_string()))?;

    let mut cfg = Config::new();
    cfg.url = Some(database_url);

    let pool = cfg
        .create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| PipelineError::DbPoolError(format!("Failed to create database pool: {}", e)))?;

    info!("Created database connection pool");
    Ok(pool)
}
