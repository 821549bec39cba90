//! Minimal client: connects, sends one message from argv, prints the echo.

use ripple_ws::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let url = std::env::args().nth(1).unwrap_or_else(|| "ws://127.0.0.1:9001".to_string());
    let message = std::env::args().nth(2).unwrap_or_else(|| "hello".to_string());

    let mut ws = ripple_ws::client::connect(&url, ClientConfig::new()).await?;
    ws.send_text(&message).await?;

    let (opcode, payload) = ws.read_message().await?;
    println!("received {opcode:?}: {}", String::from_utf8_lossy(&payload));

    ws.close().await?;
    Ok(())
}
