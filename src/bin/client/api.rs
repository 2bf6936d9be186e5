use anyhow::{bail, Context, Error};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Meal {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderItem {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedReceipt {
    pub receipt_number: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReceiptSummary {
    pub receipt_id: String,
    pub timestamp: String,
    pub total_price: f64,
    pub orders: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Deleted {
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

/// Thin wrapper over the server's `/api` routes.
pub(crate) struct Api {
    client: Client,
    base: String,
}

impl Api {
    pub fn new(host: &str) -> Self {
        Self {
            client: Client::new(),
            base: format!("{}/api", host.trim_end_matches('/')),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// non-2xx responses become errors carrying the server's message
    async fn check(res: Response) -> Result<Response, Error> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        match res.json::<ApiError>().await {
            Ok(ApiError { error }) => bail!("server answered {}, {}", status, error),
            Err(_) => bail!("server answered {}", status),
        }
    }

    pub async fn meals(&self) -> Result<Vec<Meal>, Error> {
        let res = self.client.get(self.url("meals")).send().await?;
        Ok(Self::check(res).await?.json().await.context("malformed meal list")?)
    }

    pub async fn add_meal(&self, name: &str, category: &str, price: f64) -> Result<i64, Error> {
        let res = self
            .client
            .post(self.url("meals"))
            .json(&json!({ "name": name, "type": category, "price": price }))
            .send()
            .await?;
        let created: Created = Self::check(res).await?.json().await?;
        Ok(created.id)
    }

    pub async fn delete_meal(&self, id: i64) -> Result<u64, Error> {
        let res = self.client.delete(self.url(&format!("meals/{id}"))).send().await?;
        let deleted: Deleted = Self::check(res).await?.json().await?;
        Ok(deleted.deleted)
    }

    pub async fn create_receipt(&self, total_price: f64, orders: &[OrderItem]) -> Result<CreatedReceipt, Error> {
        let res = self
            .client
            .post(self.url("receipts"))
            .json(&json!({ "totalPrice": total_price, "orders": orders }))
            .send()
            .await?;
        Ok(Self::check(res).await?.json().await?)
    }

    pub async fn receipts(&self) -> Result<Vec<ReceiptSummary>, Error> {
        let res = self.client.get(self.url("orders")).send().await?;
        Ok(Self::check(res).await?.json().await.context("malformed receipt list")?)
    }

    pub async fn update_orders(&self, receipt_number: &str, orders: &Value) -> Result<String, Error> {
        let res = self
            .client
            .put(self.url(&format!("orders/{receipt_number}")))
            .json(&json!({ "orders": orders }))
            .send()
            .await?;
        let message: Message = Self::check(res).await?.json().await?;
        Ok(message.message)
    }

    pub async fn delete_receipt(&self, receipt_number: &str) -> Result<String, Error> {
        let res = self
            .client
            .delete(self.url(&format!("receipts/{receipt_number}")))
            .send()
            .await?;
        let message: Message = Self::check(res).await?.json().await?;
        Ok(message.message)
    }
}
