//! TLS-terminating echo server. Reads a PEM certificate chain and private
//! key from the paths given on the command line and serves `wss://`.

use ripple_ws::config::ServerConfig;
use ripple_ws::OpCode;
use rustls_pemfile::{certs, private_key};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let cert_path = args.next().expect("usage: echo_server_tls <cert.pem> <key.pem>");
    let key_path = args.next().expect("usage: echo_server_tls <cert.pem> <key.pem>");

    let cert_chain = certs(&mut BufReader::new(File::open(cert_path)?))
        .collect::<Result<Vec<_>, _>>()?;
    let key = private_key(&mut BufReader::new(File::open(key_path)?))?
        .expect("no private key found in key file");

    let tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;

    let mut server_config = ServerConfig::new();
    server_config.tls_config = Some(Arc::new(tls_config));

    let mut incoming = ripple_ws::server::bind("127.0.0.1:9443", server_config).await?;
    log::info!("listening on 127.0.0.1:9443 (tls)");

    loop {
        let mut ws = incoming.accept().await?;
        tokio::spawn(async move {
            while let Ok((opcode, payload)) = ws.read_message().await {
                let result = match opcode {
                    OpCode::Text => ws.send_text(&String::from_utf8_lossy(&payload)).await,
                    OpCode::Binary => ws.send_binary(&payload).await,
                    _ => Ok(()),
                };
                if result.is_err() {
                    break;
                }
            }
        });
    }
}
