use actix_web::{web, HttpResponse};
use serde_json::Value;
use crate::server::controller::error::CustomError;
use crate::server::controller::with_timeout;
use crate::server::database::store::Store;
use crate::server::model::receipt::{MessageResponse, PostReceiptRequest, PutOrdersRequest};
use crate::server::service::receipts;
use crate::server::state::AppState;

const ORDERS_NOT_ARRAY_MSG: &str = "Invalid or missing 'orders' property. It must be an array.";

fn candidates(orders: &Option<Value>) -> Result<&[Value], CustomError> {
    orders
        .as_ref()
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| CustomError::BadRequest(ORDERS_NOT_ARRAY_MSG.to_string()))
}

/// Generate a receipt with its orders; invalid orders are dropped, never rejected.
pub(super) async fn post_receipt<S: Store>(
    body: web::Json<PostReceiptRequest>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let candidates = candidates(&body.orders)?;
    let created = with_timeout(
        data.db_timeout(),
        receipts::create_receipt(data.store(), body.total_price, candidates),
    )
    .await?;
    Ok(HttpResponse::Created().json(created))
}

/// All receipts with their orders, including receipts without any.
pub(super) async fn get_orders<S: Store>(data: web::Data<AppState<S>>) -> Result<HttpResponse, CustomError> {
    let summaries = with_timeout(data.db_timeout(), receipts::list_receipts(data.store())).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// Replace every order of a receipt.
pub(super) async fn put_orders<S: Store>(
    receipt_number: web::Path<String>,
    body: web::Json<PutOrdersRequest>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let candidates = candidates(&body.orders)?;
    with_timeout(
        data.db_timeout(),
        receipts::replace_line_items(data.store(), &receipt_number, candidates),
    )
    .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Orders for receipt {} updated successfully.", receipt_number),
    }))
}

pub(super) async fn delete_receipt<S: Store>(
    receipt_number: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    with_timeout(
        data.db_timeout(),
        receipts::delete_receipt(data.store(), &receipt_number),
    )
    .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!(
            "Receipt {} and associated orders deleted successfully.",
            receipt_number
        ),
    }))
}
