use std::future::Future;
use std::time::Duration;
use actix_web::web;
use actix_web::rt::time;
use log::warn;
use crate::server::controller::error::{json_error_handler, CustomError};
use crate::server::database::store::Store;
use crate::server::service::ServiceError;

pub(crate) mod error;
mod meals;
mod receipts;

/// Bound a service call by `limit`; dropping the call rolls back any open transaction.
async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, CustomError> {
    match time::timeout(limit, fut).await {
        Ok(result) => result.map_err(CustomError::from),
        Err(_) => {
            warn!("store call timed out after {:?}", limit);
            Err(CustomError::Timeout)
        }
    }
}

/// Mount the JSON api under `/api`.
pub(crate) fn config<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/meals")
                        .route(web::get().to(meals::get_meals::<S>))
                        .route(web::post().to(meals::post_meal::<S>)),
                )
                .service(web::resource("/meals/{id}").route(web::delete().to(meals::delete_meal::<S>)))
                .service(web::resource("/additional-meals").route(web::post().to(meals::post_additional_meal::<S>)))
                .service(
                    web::resource("/additional-meals/{id}")
                        .route(web::delete().to(meals::delete_additional_meal::<S>)),
                )
                .service(web::resource("/receipts").route(web::post().to(receipts::post_receipt::<S>)))
                .service(
                    web::resource("/receipts/{receipt_number}")
                        .route(web::delete().to(receipts::delete_receipt::<S>)),
                )
                .service(web::resource("/orders").route(web::get().to(receipts::get_orders::<S>)))
                .service(
                    web::resource("/orders/{receipt_number}")
                        .route(web::put().to(receipts::put_orders::<S>)),
                ),
        );
}
