//! In-process [`Store`] mirroring the relational semantics, used by tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use crate::server::database::error::StoreError;
use crate::server::database::store::Store;
use crate::server::model::meal::{Category, Meal, NewMeal};
use crate::server::model::receipt::{LineItem, NewReceipt, ReceiptRow};

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    /// 1-based position of the order insert that fails within a write, 0 for none
    fail_order_at: AtomicUsize,
}

#[derive(Default, Clone)]
struct Tables {
    meals: Vec<Meal>,
    receipts: Vec<(i64, NewReceipt)>,
    /// (id, receipt_id, meal_details)
    orders: Vec<(i64, i64, String)>,
    last_meal_id: i64,
    last_receipt_id: i64,
    last_order_id: i64,
}

impl Tables {
    fn receipt_id(&self, receipt_number: &str) -> Option<i64> {
        self.receipts
            .iter()
            .find(|(_, r)| r.receipt_number == receipt_number)
            .map(|(id, _)| *id)
    }

    fn push_orders(&mut self, receipt_id: i64, items: &[LineItem], fail_at: usize) -> Result<(), StoreError> {
        for (n, item) in items.iter().enumerate() {
            if n + 1 == fail_at {
                return Err(StoreError::Query("connection reset by peer".to_string()));
            }
            let blob = serde_json::to_string(item)?;
            self.push_raw_order(receipt_id, blob);
        }
        Ok(())
    }

    fn push_raw_order(&mut self, receipt_id: i64, blob: String) {
        self.last_order_id += 1;
        self.orders.push((self.last_order_id, receipt_id, blob));
    }
}

impl MemoryStore {
    pub fn with_meals(meals: &[(&str, Category, f64)]) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables();
            for (name, category, price) in meals {
                tables.last_meal_id += 1;
                let id = tables.last_meal_id;
                tables.meals.push(Meal {
                    id,
                    name: name.to_string(),
                    category: *category,
                    price: *price,
                });
            }
        }
        store
    }

    /// make every following write fail like a broken connection would
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// make the `nth` order insert of every following write fail, 0 turns it off
    pub fn fail_order_insert(&self, nth: usize) {
        self.fail_order_at.store(nth, Ordering::SeqCst);
    }

    /// store a line item blob as is, bypassing serialization
    pub fn insert_raw_order(&self, receipt_number: &str, blob: &str) {
        let mut tables = self.tables();
        let receipt_id = tables.receipt_id(receipt_number).expect("unknown receipt");
        tables.push_raw_order(receipt_id, blob.to_string());
    }

    pub fn order_count(&self) -> usize {
        self.tables().orders.len()
    }

    pub fn receipt_count(&self) -> usize {
        self.tables().receipts.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Query("connection reset by peer".to_string()));
        }
        Ok(())
    }

    /// Run `write` against the tables, restoring them when it fails.
    fn atomically<T>(&self, write: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let snapshot = (*tables).clone();
        let result = write(&mut *tables);
        if result.is_err() {
            *tables = snapshot;
        }
        result
    }
}

impl Store for MemoryStore {
    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        Ok(self.tables().meals.clone())
    }

    async fn insert_meal(&self, meal: &NewMeal) -> Result<i64, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables();
        tables.last_meal_id += 1;
        let id = tables.last_meal_id;
        tables.meals.push(Meal {
            id,
            name: meal.name.clone(),
            category: meal.category,
            price: meal.price,
        });
        Ok(id)
    }

    async fn delete_meal(&self, id: i64, category: Option<Category>) -> Result<u64, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let before = tables.meals.len();
        tables
            .meals
            .retain(|m| m.id != id || category.is_some_and(|c| c != m.category));
        Ok((before - tables.meals.len()) as u64)
    }

    async fn insert_receipt(&self, receipt: &NewReceipt, items: &[LineItem]) -> Result<i64, StoreError> {
        let fail_at = self.fail_order_at.load(Ordering::SeqCst);
        self.atomically(|tables| {
            if tables.receipt_id(&receipt.receipt_number).is_some() {
                return Err(StoreError::Query(
                    "duplicate key value violates unique constraint \"receipts_receipt_number_key\"".to_string(),
                ));
            }
            tables.last_receipt_id += 1;
            let id = tables.last_receipt_id;
            tables.receipts.push((id, receipt.clone()));
            tables.push_orders(id, items, fail_at)?;
            Ok(id)
        })
    }

    async fn list_receipt_rows(&self) -> Result<Vec<ReceiptRow>, StoreError> {
        let tables = self.tables();
        let mut rows = Vec::new();
        for (id, receipt) in &tables.receipts {
            let row = |meal_details: Option<String>| ReceiptRow {
                receipt_id: *id,
                receipt_number: receipt.receipt_number.clone(),
                issued_at: receipt.issued_at,
                total_price: receipt.total_price,
                meal_details,
            };
            let mut items = tables
                .orders
                .iter()
                .filter(|(_, receipt_id, _)| receipt_id == id)
                .peekable();
            if items.peek().is_none() {
                rows.push(row(None));
            }
            rows.extend(items.map(|(_, _, blob)| row(Some(blob.clone()))));
        }
        Ok(rows)
    }

    async fn replace_line_items(&self, receipt_number: &str, items: &[LineItem]) -> Result<bool, StoreError> {
        let fail_at = self.fail_order_at.load(Ordering::SeqCst);
        self.atomically(|tables| {
            let Some(receipt_id) = tables.receipt_id(receipt_number) else {
                return Ok(false);
            };
            tables.orders.retain(|(_, id, _)| *id != receipt_id);
            tables.push_orders(receipt_id, items, fail_at)?;
            Ok(true)
        })
    }

    async fn delete_receipt(&self, receipt_number: &str) -> Result<u64, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let Some(receipt_id) = tables.receipt_id(receipt_number) else {
            return Ok(0);
        };
        tables.receipts.retain(|(id, _)| *id != receipt_id);
        tables.orders.retain(|(_, id, _)| *id != receipt_id);
        Ok(1)
    }
}
