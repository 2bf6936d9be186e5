use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of a meal at order time, persisted as an opaque JSON blob per order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LineItem {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewReceipt {
    pub receipt_number: String,
    pub issued_at: DateTime<Utc>,
    pub total_price: f64,
}

/// One row of `receipts LEFT JOIN orders`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReceiptRow {
    pub receipt_id: i64,
    pub receipt_number: String,
    pub issued_at: DateTime<Utc>,
    pub total_price: f64,
    pub meal_details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostReceiptRequest {
    #[serde(rename = "totalPrice")]
    pub total_price: f64,
    /// kept loose so that malformed candidates can be dropped one by one
    pub orders: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostReceiptResponse {
    pub id: i64,
    pub receipt_number: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReceiptSummary {
    /// the external receipt number, not the row id
    pub receipt_id: String,
    pub timestamp: String,
    pub total_price: f64,
    pub orders: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutOrdersRequest {
    pub orders: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}
