use tokio::net::TcpListener;

/// Serve the fixture routes on `MOCK_SERVER_ADDR`, or `DEFAULT_ADDR`.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let addr = std::env::var("MOCK_SERVER_ADDR")
        .unwrap_or_else(|_| mock_server::DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    for (method, path) in mock_server::ROUTES {
        println!("{method:<5} http://{local}{path}");
    }
    mock_server::run(listener).await
}
