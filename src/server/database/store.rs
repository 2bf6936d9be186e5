use crate::server::database::error::StoreError;
use crate::server::model::meal::{Category, Meal, NewMeal};
use crate::server::model::receipt::{LineItem, NewReceipt, ReceiptRow};

/// Straight persistence operations over meals, receipts and their order line items.
///
/// Multi-step writes (`insert_receipt`, `replace_line_items`) are atomic: either every
/// row lands or none does.
pub(crate) trait Store: 'static {
    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError>;

    async fn insert_meal(&self, meal: &NewMeal) -> Result<i64, StoreError>;

    /// Rows removed. With `category` set, only a meal of that category is removed.
    async fn delete_meal(&self, id: i64, category: Option<Category>) -> Result<u64, StoreError>;

    /// Inserts the receipt together with its line items, returns the receipt row id.
    async fn insert_receipt(&self, receipt: &NewReceipt, items: &[LineItem]) -> Result<i64, StoreError>;

    /// `receipts LEFT JOIN orders`, ordered by receipt then line item.
    async fn list_receipt_rows(&self) -> Result<Vec<ReceiptRow>, StoreError>;

    /// Swaps the receipt's line items for `items`. `false` when the receipt number is unknown.
    async fn replace_line_items(&self, receipt_number: &str, items: &[LineItem]) -> Result<bool, StoreError>;

    /// Rows removed; line items go with the receipt.
    async fn delete_receipt(&self, receipt_number: &str) -> Result<u64, StoreError>;
}
