use crate::server::database::connection::Connection;
use anyhow::{anyhow, Context, Error};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;

/// A client the pool knows how to open and health-check.
pub(crate) trait DbClient: Send + Sized + 'static {
    fn connect(conn_str: String) -> impl Future<Output = Result<Self, Error>> + Send;

    fn is_closed(&self) -> bool;
}

pub(crate) struct CommonPool<C>
where C: DbClient
{
    /// pool name
    name: String,
    conn_str: String,
    /// idle clients, accessed in a FIFO manner
    clients: Mutex<VecDeque<C>>,
    /// one permit per idle client
    available: Arc<Semaphore>,
}

pub(crate) struct Pool<C>(Arc<CommonPool<C>>) where C: DbClient;

impl<C> Clone for Pool<C>
where C: DbClient
{
    fn clone(&self) -> Pool<C> {
        Pool(self.0.clone())
    }
}

impl<C> Pool<C>
where C: DbClient
{
    /// open `size` connections concurrently, fails if any of them cannot be established
    pub async fn init(name: &str, conn_str: String, size: usize) -> Result<Self, Error> {
        let mut set = JoinSet::new();
        for _ in 0..size {
            let str = conn_str.clone();
            set.spawn(C::connect(str));
        }
        let mut clients = VecDeque::with_capacity(size);
        while let Some(res) = set.join_next().await {
            let client = res
                .context("connection task panicked")?
                .with_context(|| format!("failed to create connection for pool={name}"))?;
            clients.push_back(client);
        }
        info!("pool={} created with {} connections", name, clients.len());
        Ok(Self::from_clients(name, conn_str, clients))
    }

    pub fn from_clients(name: &str, conn_str: String, clients: VecDeque<C>) -> Self {
        let available = Arc::new(Semaphore::new(clients.len()));
        Self(Arc::new(CommonPool {
            name: name.to_string(),
            conn_str,
            clients: Mutex::new(clients),
            available,
        }))
    }

    /// acquire a connection, fails once `timeout` elapses or when a closed client cannot be reopened.
    pub async fn acquire(&self, timeout: Duration) -> Result<Connection<C>, Error> {
        let permit = time::timeout(timeout, self.0.available.clone().acquire_owned())
            .await
            .map_err(|_| anyhow!("timed out to acquire a connection from pool={} after {:?}", self.0.name, timeout))?
            .with_context(|| format!("pool={} is closed", self.0.name))?;
        let client = self
            .lock_clients()
            .pop_front()
            .with_context(|| format!("pool={} has no idle connection", self.0.name))?;
        if !client.is_closed() {
            return Ok(Connection::new(client, self.clone(), permit));
        }

        warn!("pool={} handed out a closed connection, reconnecting", self.0.name);
        match C::connect(self.0.conn_str.clone()).await {
            Ok(fresh) => Ok(Connection::new(fresh, self.clone(), permit)),
            Err(e) => {
                error!("pool={} failed to reconnect, {:#}", self.0.name, e);
                // keep the slot, the next acquire retries the reconnect
                self.release(client);
                Err(e.context(format!("pool={} failed to reconnect", self.0.name)))
            }
        }
    }

    pub fn release(&self, client: C) {
        self.lock_clients().push_back(client);
    }

    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.lock_clients().len()
    }

    fn lock_clients(&self) -> MutexGuard<'_, VecDeque<C>> {
        // the guarded deque stays consistent even if a holder panicked
        self.0.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
