//! main file for the server

pub mod model;
mod controller;
mod database;
mod service;
mod state;
mod util;

use std::io;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use tokio_postgres::Client;
use crate::server::database::pool::Pool;
use crate::server::database::postgres::PgStore;
use crate::server::model::config::ServerConfig;
use crate::server::state::AppState;

/// Run the server
pub async fn run(ServerConfig {
    addr,
    db_read_conn_str,
    db_write_conn_str,
    db_pool_size,
    db_acquire_timeout,
    db_timeout,
}: ServerConfig) -> io::Result<()> {
    let read_pool = Pool::<Client>::init("read", db_read_conn_str, db_pool_size)
        .await
        .map_err(io::Error::other)?;
    let write_pool = Pool::<Client>::init("write", db_write_conn_str, db_pool_size)
        .await
        .map_err(io::Error::other)?;
    let store = PgStore::new(read_pool, write_pool, db_acquire_timeout);
    store.ensure_schema().await.map_err(io::Error::other)?;

    let state = web::Data::new(AppState::new(store, db_timeout));
    info!("listening on {}", addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(controller::config::<PgStore>)
    })
        .bind(addr)?
        .run()
        .await
}
