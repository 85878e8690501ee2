use log::info;
use mock_server::MockConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let config = match std::env::var("ALIST_PASSWORD") {
        Ok(password) => MockConfig { password },
        Err(_) => MockConfig::default(),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run(listener, config).await
}
