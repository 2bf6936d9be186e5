use derive_more::{Display, Error};
use crate::server::database::error::StoreError;

pub(crate) mod catalog;
pub(crate) mod receipts;

#[derive(Debug, Display, Error)]
pub(crate) enum ServiceError {
    /// the request was understood but its content is rejected
    #[display("{_0}")]
    Invalid(#[error(not(source))] String),
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),
    #[display("{_0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}
