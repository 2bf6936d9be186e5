use log::{error, info, warn};
use serde_json::Value;
use uuid::Uuid;
use crate::server::database::store::Store;
use crate::server::model::receipt::{LineItem, NewReceipt, PostReceiptResponse, ReceiptRow, ReceiptSummary};
use crate::server::service::ServiceError;
use crate::server::util::time::helper::{get_utc_now, to_iso8601};

/// Turns one candidate into a line item: it must be an object with a non-empty string `name`,
/// a non-empty string `type` and a numeric `price`. Non-string names and types are dropped.
pub(crate) fn validate_candidate(candidate: &Value) -> Result<LineItem, String> {
    let Some(fields) = candidate.as_object() else {
        return Err("not an object".to_string());
    };
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| format!("missing or empty '{key}'"))
    };
    let name = text("name")?;
    let category = text("type")?;
    let price = fields
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(|| "'price' is not a number".to_string())?;
    Ok(LineItem { name, category, price })
}

/// Valid candidates in their original order; the rest are logged and dropped.
fn accept_candidates(candidates: &[Value]) -> Vec<LineItem> {
    candidates
        .iter()
        .filter_map(|candidate| match validate_candidate(candidate) {
            Ok(item) => Some(item),
            Err(reason) => {
                warn!("dropping invalid order {}, {}", candidate, reason);
                None
            }
        })
        .collect()
}

pub(crate) fn generate_receipt_number() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) async fn create_receipt(
    store: &impl Store,
    total_price: f64,
    candidates: &[Value],
) -> Result<PostReceiptResponse, ServiceError> {
    let receipt = NewReceipt {
        receipt_number: generate_receipt_number(),
        issued_at: get_utc_now(),
        total_price,
    };
    let items = accept_candidates(candidates);
    let id = store.insert_receipt(&receipt, &items).await.inspect_err(|e| {
        error!("failed to create receipt {}, {}", receipt.receipt_number, e);
    })?;
    info!(
        "receipt {} created with {} of {} orders",
        receipt.receipt_number,
        items.len(),
        candidates.len()
    );
    Ok(PostReceiptResponse {
        id,
        receipt_number: receipt.receipt_number,
        timestamp: to_iso8601(&receipt.issued_at),
    })
}

/// Folds joined rows into one summary per receipt. Rows of a receipt are adjacent.
pub(crate) fn group_rows(rows: Vec<ReceiptRow>) -> Vec<ReceiptSummary> {
    let mut summaries: Vec<(i64, ReceiptSummary)> = Vec::new();
    for row in rows {
        if summaries.last().map(|(id, _)| *id) != Some(row.receipt_id) {
            summaries.push((row.receipt_id, ReceiptSummary {
                receipt_id: row.receipt_number.clone(),
                timestamp: to_iso8601(&row.issued_at),
                total_price: row.total_price,
                orders: vec![],
            }));
        }
        let Some(details) = row.meal_details else {
            continue;
        };
        match serde_json::from_str::<LineItem>(&details) {
            Ok(item) => {
                if let Some((_, summary)) = summaries.last_mut() {
                    summary.orders.push(item);
                }
            }
            Err(e) => error!(
                "skipping unreadable order of receipt {}, {}",
                row.receipt_number, e
            ),
        }
    }
    summaries.into_iter().map(|(_, summary)| summary).collect()
}

pub(crate) async fn list_receipts(store: &impl Store) -> Result<Vec<ReceiptSummary>, ServiceError> {
    let rows = store.list_receipt_rows().await?;
    Ok(group_rows(rows))
}

pub(crate) async fn replace_line_items(
    store: &impl Store,
    receipt_number: &str,
    candidates: &[Value],
) -> Result<(), ServiceError> {
    let items = accept_candidates(candidates);
    if !store.replace_line_items(receipt_number, &items).await? {
        return Err(ServiceError::NotFound(format!("Receipt {receipt_number} not found.")));
    }
    info!(
        "receipt {} now has {} of {} orders",
        receipt_number,
        items.len(),
        candidates.len()
    );
    Ok(())
}

/// Rows removed; an unknown receipt number is not an error.
pub(crate) async fn delete_receipt(store: &impl Store, receipt_number: &str) -> Result<u64, ServiceError> {
    let deleted = store.delete_receipt(receipt_number).await?;
    info!("receipt {} deleted, rows={}", receipt_number, deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::server::database::memory::MemoryStore;
    use crate::server::model::meal::Category;

    fn item(name: &str, category: &str, price: f64) -> LineItem {
        LineItem {
            name: name.to_string(),
            category: category.to_string(),
            price,
        }
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_meals(&[
            ("Pancakes", Category::Breakfast, 5.99),
            ("Fries", Category::Additional, 3.99),
        ])
    }

    #[test]
    fn candidate_validation() {
        assert_eq!(
            validate_candidate(&json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})),
            Ok(item("Pancakes", "Breakfast", 5.99))
        );
        assert_eq!(
            validate_candidate(&json!({"name": "Fries", "type": "Additional", "price": 4})),
            Ok(item("Fries", "Additional", 4.0))
        );
        for bad in [
            json!({"name": "", "type": "Breakfast", "price": 5.99}),
            json!({"type": "Breakfast", "price": 5.99}),
            json!({"name": "Pancakes", "type": "", "price": 5.99}),
            json!({"name": "Pancakes", "type": "Breakfast", "price": "5.99"}),
            json!({"name": "Pancakes", "type": "Breakfast"}),
            // line items are stored with string names and types only
            json!({"name": 42, "type": "Breakfast", "price": 5.99}),
            json!({"name": "Pancakes", "type": true, "price": 5.99}),
            json!({"name": ["Pancakes"], "type": "Breakfast", "price": 5.99}),
            json!("Pancakes"),
            json!(null),
        ] {
            assert!(validate_candidate(&bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn receipt_numbers_are_unique_uuids() {
        let (a, b) = (generate_receipt_number(), generate_receipt_number());
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[tokio::test]
    async fn create_and_list_scenario() {
        let store = seeded();
        let created = create_receipt(&store, 9.98, &[
            json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99}),
            json!({"name": "Fries", "type": "Additional", "price": 3.99}),
        ])
        .await
        .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.timestamp, "1970-01-01T00:00:00.000Z");

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receipt_id, created.receipt_number);
        assert_eq!(receipts[0].total_price, 9.98);
        assert_eq!(receipts[0].orders, vec![
            item("Pancakes", "Breakfast", 5.99),
            item("Fries", "Additional", 3.99),
        ]);
    }

    #[tokio::test]
    async fn empty_receipt_is_listed_with_no_items() {
        let store = seeded();
        let created = create_receipt(&store, 0.0, &[]).await.unwrap();

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receipt_id, created.receipt_number);
        assert!(receipts[0].orders.is_empty());
    }

    #[tokio::test]
    async fn invalid_candidates_are_dropped() {
        let store = seeded();
        create_receipt(&store, 5.99, &[json!({"name": "", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();
        create_receipt(&store, 15.97, &[
            json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99}),
            json!({"name": "Fries", "type": "", "price": 3.99}),
            json!({"name": "Fries", "type": "Additional", "price": "free"}),
            json!({"name": "Steak", "type": "Dinner", "price": 12.99}),
        ])
        .await
        .unwrap();

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert!(receipts[0].orders.is_empty());
        assert_eq!(receipts[1].orders, vec![
            item("Pancakes", "Breakfast", 5.99),
            item("Steak", "Dinner", 12.99),
        ]);
        assert_eq!(store.order_count(), 2);
    }

    #[tokio::test]
    async fn store_failure_leaves_nothing_behind() {
        let store = seeded();
        store.fail_writes(true);
        let res = create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})]).await;
        assert!(matches!(res, Err(ServiceError::Store(_))));
        assert_eq!(store.receipt_count(), 0);
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn failed_order_insert_rolls_back_the_receipt() {
        let store = seeded();
        store.fail_order_insert(2);
        let res = create_receipt(&store, 9.98, &[
            json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99}),
            json!({"name": "Fries", "type": "Additional", "price": 3.99}),
        ])
        .await;
        assert!(matches!(res, Err(ServiceError::Store(_))));
        assert_eq!(store.receipt_count(), 0);
        assert_eq!(store.order_count(), 0);
        assert!(list_receipts(&store).await.unwrap().is_empty());

        store.fail_order_insert(0);
        create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();
        assert_eq!(store.receipt_count(), 1);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn failed_replace_keeps_old_items() {
        let store = seeded();
        let created = create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();

        store.fail_order_insert(2);
        let res = replace_line_items(&store, &created.receipt_number, &[
            json!({"name": "Steak", "type": "Dinner", "price": 12.99}),
            json!({"name": "Fries", "type": "Additional", "price": 3.99}),
        ])
        .await;
        assert!(matches!(res, Err(ServiceError::Store(_))));

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts[0].orders, vec![item("Pancakes", "Breakfast", 5.99)]);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn replace_supersedes_old_items() {
        let store = seeded();
        let created = create_receipt(&store, 9.98, &[
            json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99}),
            json!({"name": "Fries", "type": "Additional", "price": 3.99}),
        ])
        .await
        .unwrap();

        replace_line_items(&store, &created.receipt_number, &[
            json!({"name": "Steak", "type": "Dinner", "price": 12.99}),
            json!({"name": "", "type": "Dinner", "price": 10.99}),
        ])
        .await
        .unwrap();

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts[0].orders, vec![item("Steak", "Dinner", 12.99)]);
        // the total is what the client sent and is not recomputed
        assert_eq!(receipts[0].total_price, 9.98);
    }

    #[tokio::test]
    async fn replace_unknown_receipt_is_not_found() {
        let store = seeded();
        let res = replace_line_items(&store, "no-such-receipt", &[]).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_cascades_and_tolerates_unknown_numbers() {
        let store = seeded();
        let kept = create_receipt(&store, 3.99, &[json!({"name": "Fries", "type": "Additional", "price": 3.99})])
            .await
            .unwrap();
        let gone = create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();

        assert_eq!(delete_receipt(&store, &gone.receipt_number).await.unwrap(), 1);
        assert_eq!(delete_receipt(&store, &gone.receipt_number).await.unwrap(), 0);

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receipt_id, kept.receipt_number);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn deleting_a_meal_keeps_historical_items() {
        let store = seeded();
        create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();

        assert_eq!(store.delete_meal(1, None).await.unwrap(), 1);

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts[0].orders, vec![item("Pancakes", "Breakfast", 5.99)]);
    }

    #[tokio::test]
    async fn unreadable_blobs_are_skipped() {
        let store = seeded();
        let created = create_receipt(&store, 5.99, &[json!({"name": "Pancakes", "type": "Breakfast", "price": 5.99})])
            .await
            .unwrap();
        store.insert_raw_order(&created.receipt_number, "{not json");

        let receipts = list_receipts(&store).await.unwrap();
        assert_eq!(receipts[0].orders, vec![item("Pancakes", "Breakfast", 5.99)]);
    }
}
