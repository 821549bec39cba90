//! The server upgrade path, §4.10.

use crate::config::ServerConfig;
use crate::connection::WebSocket;
use crate::error::Error;
use crate::handshake::compute_accept_key;
use crate::request::{build_handshake_response, parse_http_request};
use crate::stream::MaybeTlsStream;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

/// Reads an inbound HTTP/1.1 request off `stream`, validates it as a
/// WebSocket upgrade, writes the 101 response, and returns the upgraded
/// connection with `is_server=true`.
pub async fn accept<S: AsyncRead + AsyncWrite + Unpin>(
    stream: S,
    config: ServerConfig,
) -> Result<WebSocket<S>, Error> {
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let request = tokio::time::timeout(config.handshake_timeout, parse_http_request(&mut reader))
        .await??;

    let challenge = request.sec_websocket_key()?;
    let accept_key = compute_accept_key(challenge);
    let response = build_handshake_response(&accept_key);
    write_half.write_all(response.as_bytes()).await?;
    write_half.flush().await?;

    info!("websocket server handshake complete");

    let stream = reader.into_inner().unsplit(write_half);
    Ok(WebSocket::new(stream, true))
}

/// A listener that performs the HTTP upgrade on each accepted socket and
/// hands back connections one at a time (§4.10).
pub struct Incoming {
    listener: TcpListener,
    tls_acceptor: Option<TlsAcceptor>,
    config: ServerConfig,
}

/// Binds `addr` and returns an [`Incoming`] that upgrades one connection per
/// call to [`Incoming::accept`].
pub async fn bind(addr: &str, config: ServerConfig) -> Result<Incoming, Error> {
    let listener = TcpListener::bind(addr).await?;
    let tls_acceptor = config.tls_config.clone().map(TlsAcceptor::from);
    Ok(Incoming {
        listener,
        tls_acceptor,
        config,
    })
}

impl Incoming {
    /// Accepts the next TCP connection, optionally terminates TLS, then
    /// performs the WebSocket upgrade.
    pub async fn accept(&mut self) -> Result<WebSocket<MaybeTlsStream>, Error> {
        let (tcp_stream, _addr) = self.listener.accept().await?;
        let stream = self.wrap_tls(tcp_stream).await?;
        accept(stream, self.config.clone()).await
    }

    async fn wrap_tls(&self, tcp_stream: TcpStream) -> Result<MaybeTlsStream, Error> {
        match &self.tls_acceptor {
            Some(acceptor) => {
                let tls_stream = acceptor.accept(tcp_stream).await.map_err(|err| {
                    warn!("TLS accept failed: {err}");
                    Error::Io { source: err }
                })?;
                Ok(MaybeTlsStream::ServerTls(Box::new(tls_stream)))
            }
            None => Ok(MaybeTlsStream::Plain(tcp_stream)),
        }
    }
}
