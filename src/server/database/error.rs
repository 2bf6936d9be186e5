use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    /// no connection could be handed out, carries the pool's reason
    #[display("{_0}")]
    Unavailable(#[error(not(source))] String),
    #[display("{_0}")]
    Query(#[error(not(source))] String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        // db errors carry the useful part (constraint, detail) in the source
        match e.as_db_error() {
            Some(db_error) => StoreError::Query(db_error.to_string()),
            None => StoreError::Query(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Query(format!("failed to serialize meal details, {e}"))
    }
}
