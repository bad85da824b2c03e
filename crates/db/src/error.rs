use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store operation '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("store connection lock poisoned")]
    Poisoned,

    #[error("store task failed")]
    Join(#[from] tokio::task::JoinError),

    #[error("table '{table}' does not exist; run migrations first")]
    MissingSchema { table: &'static str },
}
