//! HTTP/1.1 handshake transport, component C13: URL parsing and GET request
//! construction for the client path (§4.9), request parsing for the server
//! path (§4.10).

use crate::error::Error;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use url::Url;

/// The pieces of a parsed `ws://`/`wss://` URL needed to dial and to build
/// the handshake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsUrl {
    pub use_tls: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl WsUrl {
    /// The string used to open the TCP connection, e.g. `"example.com:80"`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a WebSocket URL, rejecting any scheme other than `ws`/`wss` (§6,
/// Testable Property 8).
pub fn parse_ws_url(url: &str) -> Result<WsUrl, Error> {
    let parsed = Url::parse(url)?;

    let (use_tls, default_port) = match parsed.scheme() {
        "ws" => (false, 80),
        "wss" => (true, 443),
        _ => return Err(Error::InvalidSchemeURL),
    };

    let host = parsed.host_str().ok_or(Error::URLNoHost)?.to_string();
    let port = parsed.port().unwrap_or(default_port);

    let path = match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    };

    Ok(WsUrl {
        use_tls,
        host,
        port,
        path,
    })
}

/// Builds the client's handshake GET request.
pub fn build_handshake_request(url: &WsUrl, challenge: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Connection: Upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Version: 13\r\n\
         Sec-WebSocket-Key: {}\r\n\
         \r\n",
        url.path,
        url.authority(),
        challenge,
    )
}

/// The server's handshake response, embedding the computed accept key.
pub fn build_handshake_response(accept_key: &str) -> String {
    format!(
        "HTTP/1.1 101 Switching Protocols\r\n\
         Connection: upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Accept: {}\r\n\
         \r\n",
        accept_key
    )
}

/// A parsed inbound HTTP/1.1 request, lower-cased header names.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    pub headers: HashMap<String, String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Validates the handshake prerequisites and returns the
    /// `Sec-WebSocket-Key` value on success (§4.10).
    pub fn sec_websocket_key(&self) -> Result<&str, Error> {
        if self.method != "GET" {
            return Err(Error::InvalidHTTPHandshake);
        }
        let connection = self.header("connection").ok_or(Error::NoConnectionHeaderPresent)?;
        if !connection.to_lowercase().contains("upgrade") {
            return Err(Error::NoConnectionHeaderPresent);
        }
        let upgrade = self.header("upgrade").ok_or(Error::NoUpgradeHeaderPresent)?;
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(Error::NoUpgradeHeaderPresent);
        }
        self.header("host").ok_or(Error::NoHostHeaderPresent)?;
        self.header("sec-websocket-key").ok_or(Error::NoSecWebsocketKey)
    }
}

/// Reads and parses an inbound HTTP/1.1 request, one buffered read at a time
/// until the terminating blank line arrives.
pub async fn parse_http_request<S: AsyncRead + Unpin>(
    reader: &mut BufReader<S>,
) -> Result<HttpRequest, Error> {
    let mut buffer = Vec::with_capacity(1024);
    let mut probe = [0u8; 512];

    loop {
        if let Some(end) = find_header_terminator(&buffer) {
            buffer.truncate(end);
            break;
        }
        let n = reader.read(&mut probe).await?;
        if n == 0 {
            return Err(Error::IncompleteHTTPRequest);
        }
        buffer.extend_from_slice(&probe[..n]);
    }

    let mut header_slots = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut header_slots);
    req.parse(&buffer)?;

    let method = req.method.unwrap_or("").to_string();
    let mut headers = HashMap::new();
    for header in req.headers.iter() {
        headers.insert(
            header.name.to_lowercase(),
            String::from_utf8_lossy(header.value).into_owned(),
        );
    }

    Ok(HttpRequest { method, headers })
}

fn find_header_terminator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ws_url_with_default_port_and_root_path() {
        let url = parse_ws_url("ws://www.example.com").unwrap();
        assert!(!url.use_tls);
        assert_eq!(url.host, "www.example.com");
        assert_eq!(url.port, 80);
        assert_eq!(url.path, "/");
    }

    #[test]
    fn parses_wss_url_with_explicit_port_path_and_query() {
        let url = parse_ws_url("wss://h:4433/p?q=1").unwrap();
        assert!(url.use_tls);
        assert_eq!(url.host, "h");
        assert_eq!(url.port, 4433);
        assert_eq!(url.path, "/p?q=1");
    }

    #[test]
    fn rejects_non_websocket_scheme() {
        assert!(parse_ws_url("wsx://h").is_err());
    }

    #[test]
    fn handshake_request_contains_required_headers() {
        let url = parse_ws_url("ws://example.com/chat").unwrap();
        let request = build_handshake_request(&url, "dGhlIHNhbXBsZSBub25jZQ==");
        assert!(request.starts_with("GET /chat HTTP/1.1\r\n"));
        assert!(request.contains("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n"));
        assert!(request.contains("Upgrade: websocket\r\n"));
    }
}
