use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use mock_server::{AppState, DEFAULT_TOKEN, DEFAULT_USERNAME};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let username = std::env::var("SMARTBILL_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string());
    let token = std::env::var("SMARTBILL_TOKEN").unwrap_or_else(|_| DEFAULT_TOKEN.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %username, "mock SmartBill API listening");
    mock_server::serve(listener, AppState::new(&username, &token)).await
}
