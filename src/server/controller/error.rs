use actix_web::{error, HttpRequest, HttpResponse};
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use log::{error, warn};
use serde_json::json;
use crate::server::service::ServiceError;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),
    #[display("{_0}")]
    ResourceNotFound(#[error(not(source))] String),
    #[display("{_0}")]
    DbError(#[error(not(source))] String),
    #[display("timeout occurred")]
    Timeout,
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CustomError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            CustomError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(json!({ "error": self.to_string() }))
    }
}

impl From<ServiceError> for CustomError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(msg) => CustomError::BadRequest(msg),
            ServiceError::NotFound(msg) => CustomError::ResourceNotFound(msg),
            ServiceError::Store(e) => {
                error!("store failure, {}", e);
                CustomError::DbError(e.to_string())
            }
        }
    }
}

/// Body deserialization failures answer 400 with the reason.
pub(crate) fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> error::Error {
    warn!("rejecting body of {} {}, {}", req.method(), req.path(), err);
    CustomError::BadRequest(err.to_string()).into()
}
