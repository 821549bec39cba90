//! Plain-TCP echo server: accepts one connection at a time and echoes every
//! text/binary message back to its sender until the peer closes.

use ripple_ws::config::ServerConfig;
use ripple_ws::{Error, OpCode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut incoming = ripple_ws::server::bind("127.0.0.1:9001", ServerConfig::new()).await?;
    log::info!("listening on 127.0.0.1:9001");

    loop {
        let mut ws = incoming.accept().await?;
        tokio::spawn(async move {
            loop {
                match ws.read_message().await {
                    Ok((OpCode::Text, payload)) => {
                        let text = String::from_utf8_lossy(&payload).into_owned();
                        if ws.send_text(&text).await.is_err() {
                            break;
                        }
                    }
                    Ok((OpCode::Binary, payload)) => {
                        if ws.send_binary(&payload).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(Error::Close(_)) => break,
                    Err(err) => {
                        log::warn!("connection error: {err}");
                        break;
                    }
                }
            }
        });
    }
}
