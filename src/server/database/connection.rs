use std::ops::{Deref, DerefMut};
use anyhow::Error;
use log::error;
use tokio::sync::OwnedSemaphorePermit;
use tokio_postgres::{Client, NoTls};
use crate::server::database::pool::{DbClient, Pool};

/// A pooled client, handed back to its pool on drop.
pub(crate) struct Connection<C>
where C: DbClient
{
    client: Option<C>,
    pool: Pool<C>,
    // released after the client is back in the pool
    _permit: OwnedSemaphorePermit,
}

impl DbClient for Client {
    async fn connect(conn_str: String) -> Result<Self, Error> {
        let (client, conn) = tokio_postgres::connect(conn_str.as_str(), NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }

    fn is_closed(&self) -> bool {
        Client::is_closed(self)
    }
}

impl<C> Connection<C>
where C: DbClient
{
    pub fn new(client: C, pool: Pool<C>, permit: OwnedSemaphorePermit) -> Self {
        Self { client: Some(client), pool, _permit: permit }
    }
}

impl<C> Deref for Connection<C>
where C: DbClient
{
    type Target = C;

    fn deref(&self) -> &C {
        // only `drop` takes the client out
        self.client.as_ref().expect("connection used after release")
    }
}

impl<C> DerefMut for Connection<C>
where C: DbClient
{
    fn deref_mut(&mut self) -> &mut C {
        self.client.as_mut().expect("connection used after release")
    }
}

impl<C> Drop for Connection<C>
where C: DbClient
{
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
