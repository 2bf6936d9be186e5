use std::net::SocketAddrV4;
use std::time::Duration;

/// Server configs
#[derive(Debug)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    pub db_read_conn_str: String,
    pub db_write_conn_str: String,
    /// connections opened per pool
    pub db_pool_size: usize,
    /// how long a request waits for a pooled connection
    pub db_acquire_timeout: Duration,
    /// upper bound for each store call, acquiring included
    pub db_timeout: Duration,
}

impl ServerConfig {
    pub fn new(
        addr: SocketAddrV4,
        db_read_conn_str: String,
        db_write_conn_str: String,
        db_pool_size: usize,
        db_acquire_timeout: Duration,
        db_timeout: Duration,
    ) -> Self {
        Self {
            addr,
            db_read_conn_str,
            db_write_conn_str,
            db_pool_size,
            db_acquire_timeout,
            db_timeout,
        }
    }
}
