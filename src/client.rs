//! The client dial path, §4.9.

use crate::config::ClientConfig;
use crate::connection::WebSocket;
use crate::error::Error;
use crate::handshake::{compute_accept_key, generate_challenge_key};
use crate::request::{build_handshake_request, parse_ws_url};
use crate::stream::MaybeTlsStream;
use log::info;
use rustls::pki_types::ServerName;
use rustls::RootCertStore;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Dials `url` (`ws://` or `wss://`), performs the HTTP/1.1 upgrade, and
/// returns the connection with `is_server=false`.
pub async fn connect(url: &str, config: ClientConfig) -> Result<WebSocket<MaybeTlsStream>, Error> {
    let ws_url = parse_ws_url(url)?;

    let tcp_stream = tokio::time::timeout(
        config.handshake_timeout,
        TcpStream::connect(ws_url.authority()),
    )
    .await??;

    let mut stream = if ws_url.use_tls {
        MaybeTlsStream::ClientTls(Box::new(tls_wrap(tcp_stream, &ws_url.host, &config).await?))
    } else {
        MaybeTlsStream::Plain(tcp_stream)
    };

    let challenge = generate_challenge_key();
    let request = build_handshake_request(&ws_url, &challenge);
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let response = read_handshake_response(&mut stream).await?;
    verify_handshake_response(&response, &challenge)?;

    info!("websocket client handshake complete");

    Ok(WebSocket::new(stream, false))
}

async fn tls_wrap(
    tcp_stream: TcpStream,
    host: &str,
    config: &ClientConfig,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    if let Some(pem) = &config.extra_root_certs_pem {
        let mut cursor = std::io::Cursor::new(pem);
        for cert in rustls_pemfile::certs(&mut cursor).flatten() {
            roots.add(cert).map_err(|err| Error::Io {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
            })?;
        }
    }
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(tls_config));
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|source| Error::Domain { source })?;
    connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|source| Error::Io { source })
}

async fn read_handshake_response(stream: &mut MaybeTlsStream) -> Result<String, Error> {
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::with_capacity(1024);
    let mut probe = [0u8; 512];
    loop {
        if let Some(end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            buffer.truncate(end + 4);
            break;
        }
        let n = reader.read(&mut probe).await?;
        if n == 0 {
            return Err(Error::IncompleteHTTPRequest);
        }
        buffer.extend_from_slice(&probe[..n]);
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn verify_handshake_response(response: &str, challenge: &str) -> Result<(), Error> {
    let status_line = response.lines().next().unwrap_or("");
    if !status_line.contains(" 101 ") {
        return Err(Error::NoUpgrade);
    }
    let expected = compute_accept_key(challenge);
    let accept_header = response
        .lines()
        .find(|line| line.to_lowercase().starts_with("sec-websocket-accept:"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
        .ok_or(Error::InvalidAcceptKey)?;
    if accept_header != expected {
        return Err(Error::InvalidAcceptKey);
    }
    Ok(())
}
