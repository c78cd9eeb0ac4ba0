use prk_todo::adapters::{HttpServer, HttpServerConfig};
use prk_todo::config::AppConfig;
use prk_todo::services::TodoServiceImpl;
use prk_todo::storage::sqlite::SqliteTodoRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
            .init();
    }
    let config = AppConfig::from_env()?;
    let repo = SqliteTodoRepository::new(&config.database_url).await?;
    let todo_service = TodoServiceImpl::new(repo);
    let http_server = HttpServer::new(todo_service, HttpServerConfig::from(&config)).await?;
    http_server.run().await?;
    Ok(())
}
