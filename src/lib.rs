mod api;
mod config;
mod error;
mod memory;
mod models;
mod repo;
mod validation;

use std::net::SocketAddr;

use axum::{serve::Serve, Router};
use tokio::net::TcpListener;
use tracing::info;

pub use api::build_app;
pub use config::{Config, ConfigError};
pub use memory::InMemoryBookRepo;

/// Binds the listener and returns its address along with the server future,
/// which does nothing until awaited.
pub async fn start_server(
    config: &Config,
) -> std::io::Result<(SocketAddr, Serve<TcpListener, Router, Router>)> {
    let router = build_app(InMemoryBookRepo::new());

    let listener = TcpListener::bind(config.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    Ok((local_addr, axum::serve(listener, router)))
}
