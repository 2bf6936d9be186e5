use std::time::Duration;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Transaction};
use crate::server::database::connection::Connection;
use crate::server::database::error::StoreError;
use crate::server::database::pool::Pool;
use crate::server::database::store::Store;
use crate::server::model::meal::{Category, Meal, NewMeal};
use crate::server::model::receipt::{LineItem, NewReceipt, ReceiptRow};

pub(crate) const SCHEMA: &str = include_str!("sql/schema.sql");

/// [`Store`] over PostgreSQL, reads and writes go through separate pools.
pub(crate) struct PgStore {
    read_pool: Pool<Client>,
    write_pool: Pool<Client>,
    acquire_timeout: Duration,
}

impl PgStore {
    pub fn new(read_pool: Pool<Client>, write_pool: Pool<Client>, acquire_timeout: Duration) -> Self {
        Self {
            read_pool,
            write_pool,
            acquire_timeout,
        }
    }

    /// create the tables if absent
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.write_conn().await?;
        conn.batch_execute(SCHEMA).await?;
        info!("schema is ready");
        Ok(())
    }

    async fn read_conn(&self) -> Result<Connection<Client>, StoreError> {
        self.read_pool
            .acquire(self.acquire_timeout)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{e:#}")))
    }

    async fn write_conn(&self) -> Result<Connection<Client>, StoreError> {
        self.write_pool
            .acquire(self.acquire_timeout)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{e:#}")))
    }
}

/// Issue every insert on the transaction at once and wait for all of them.
/// Each failure is logged; the first one is returned so the caller rolls back.
async fn insert_line_items(txn: &Transaction<'_>, receipt_id: i64, items: &[LineItem]) -> Result<(), StoreError> {
    if items.is_empty() {
        return Ok(());
    }
    let blobs = items
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    let stmt = txn
        .prepare("INSERT INTO orders (receipt_id, meal_details) VALUES ($1, $2)")
        .await?;
    let params: Vec<[&(dyn ToSql + Sync); 2]> = blobs
        .iter()
        .map(|blob| [&receipt_id as &(dyn ToSql + Sync), blob as &(dyn ToSql + Sync)])
        .collect();

    let results = join_all(params.iter().map(|p| txn.execute(&stmt, p))).await;

    let mut first_err = None;
    for (result, item) in results.into_iter().zip(items) {
        match result {
            Ok(_) => debug!("order {:?} inserted for receipt id={}", item, receipt_id),
            Err(e) => {
                error!("failed to insert order {:?} for receipt id={}, {}", item, receipt_id, e);
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

impl Store for PgStore {
    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        let conn = self.read_conn().await?;
        let rows = conn
            .query("SELECT id, name, type, price FROM meals ORDER BY id", &[])
            .await?;
        let mut meals = Vec::with_capacity(rows.len());
        for r in rows {
            let category = match r.try_get::<&str, &str>("type")?.parse::<Category>() {
                Ok(category) => category,
                Err(e) => {
                    warn!("skipping meal row, {}", e);
                    continue;
                }
            };
            meals.push(Meal {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
                category,
                price: r.try_get("price")?,
            });
        }
        Ok(meals)
    }

    async fn insert_meal(&self, meal: &NewMeal) -> Result<i64, StoreError> {
        let conn = self.write_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO meals (name, type, price) VALUES ($1, $2, $3) RETURNING id",
                &[&meal.name, &meal.category.as_str(), &meal.price],
            )
            .await?;
        Ok(row.try_get("id")?)
    }

    async fn delete_meal(&self, id: i64, category: Option<Category>) -> Result<u64, StoreError> {
        let conn = self.write_conn().await?;
        let deleted = match category {
            Some(category) => {
                conn.execute(
                    "DELETE FROM meals WHERE id = $1 AND type = $2",
                    &[&id, &category.as_str()],
                )
                .await?
            }
            None => conn.execute("DELETE FROM meals WHERE id = $1", &[&id]).await?,
        };
        Ok(deleted)
    }

    async fn insert_receipt(&self, receipt: &NewReceipt, items: &[LineItem]) -> Result<i64, StoreError> {
        let mut conn = self.write_conn().await?;
        let txn = conn.transaction().await?;
        let row = txn
            .query_one(
                r#"
                INSERT INTO receipts (receipt_number, issued_at, total_price)
                VALUES ($1, $2, $3)
                RETURNING id
            "#,
                &[&receipt.receipt_number, &receipt.issued_at, &receipt.total_price],
            )
            .await?;
        let receipt_id: i64 = row.try_get("id")?;
        // an early return drops the transaction, which rolls it back
        insert_line_items(&txn, receipt_id, items).await?;
        txn.commit().await?;
        Ok(receipt_id)
    }

    async fn list_receipt_rows(&self) -> Result<Vec<ReceiptRow>, StoreError> {
        let conn = self.read_conn().await?;
        let rows = conn
            .query(
                r#"
                SELECT r.id AS receipt_id, r.receipt_number, r.issued_at, r.total_price, o.meal_details
                FROM receipts r
                LEFT JOIN orders o
                ON r.id = o.receipt_id
                ORDER BY r.id, o.id
            "#,
                &[],
            )
            .await?;
        rows.into_iter()
            .map(|r| -> Result<ReceiptRow, StoreError> {
                let issued_at: DateTime<Utc> = r.try_get("issued_at")?;
                Ok(ReceiptRow {
                    receipt_id: r.try_get("receipt_id")?,
                    receipt_number: r.try_get("receipt_number")?,
                    issued_at,
                    total_price: r.try_get("total_price")?,
                    meal_details: r.try_get("meal_details")?,
                })
            })
            .collect()
    }

    async fn replace_line_items(&self, receipt_number: &str, items: &[LineItem]) -> Result<bool, StoreError> {
        let mut conn = self.write_conn().await?;
        let txn = conn.transaction().await?;
        // the row lock keeps concurrent replaces of one receipt from interleaving
        let receipt_id: i64 = match txn
            .query_opt(
                "SELECT id FROM receipts WHERE receipt_number = $1 FOR UPDATE",
                &[&receipt_number],
            )
            .await?
        {
            Some(row) => row.try_get("id")?,
            None => return Ok(false),
        };
        let removed = txn
            .execute("DELETE FROM orders WHERE receipt_id = $1", &[&receipt_id])
            .await?;
        debug!("removed {} orders of receipt {}", removed, receipt_number);
        insert_line_items(&txn, receipt_id, items).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn delete_receipt(&self, receipt_number: &str) -> Result<u64, StoreError> {
        let conn = self.write_conn().await?;
        Ok(conn
            .execute("DELETE FROM receipts WHERE receipt_number = $1", &[&receipt_number])
            .await?)
    }
}
