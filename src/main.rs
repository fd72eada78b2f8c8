use bookshelf_api::{start_server, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bookshelf_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (_, server) = start_server(&config).await?;
    server.await?;

    Ok(())
}
