use crate::close::CloseError;
use httparse::Error as HttpParseError;
use pki_types::InvalidDnsNameError;
use std::io;
use std::str::Utf8Error;
use thiserror::Error;
use tokio::time::error::Elapsed;
use url::ParseError;

#[derive(Error, Debug)]
pub enum Error {
    // General Errors
    #[error("{source}")]
    Timeout {
        #[from]
        source: Elapsed,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("text frame payload is not valid UTF-8: {source}")]
    Utf8 {
        #[from]
        source: Utf8Error,
    },

    // Handshake Errors
    #[error("invalid handshake request method or version")]
    InvalidHTTPHandshake,

    #[error("Connection: Upgrade header missing in the request")]
    NoConnectionHeaderPresent,

    #[error("Upgrade: websocket header missing in the request")]
    NoUpgradeHeaderPresent,

    #[error("Host header missing in the request")]
    NoHostHeaderPresent,

    #[error("couldn't find Sec-WebSocket-Key header in the request")]
    NoSecWebsocketKey,

    #[error("server didn't upgrade the connection")]
    NoUpgrade,

    #[error("server didn't send a valid Sec-WebSocket-Accept key")]
    InvalidAcceptKey,

    // Framing errors (§4.1, §4.2, C1 Frame::valid)
    #[error("RSV bit set without a negotiated extension")]
    RsvNotZero,

    #[error("masking key must not be zero")]
    MaskKeyZero,

    #[error("control frames must not be fragmented")]
    ControlFrameFragmented,

    #[error("control frame payload must be at most 125 bytes")]
    ControlFramePayloadSize,

    #[error("invalid opcode")]
    InvalidOpcode,

    // Masking-direction errors (§4.6, C6)
    #[error("client frames must be masked")]
    MaskNotSet,

    #[error("server frames must not be masked")]
    MaskSet,

    // Fragmentation / state errors (C9)
    #[error("continuation frame received with no fragmented message in progress")]
    InvalidContinuation,

    #[error("data frame received while a fragmented message is already in progress")]
    FragmentedInProgress,

    #[error("operation invalid in the connection's current state")]
    InvalidState,

    // Close error (§4.8, C8)
    #[error("{0}")]
    Close(CloseError),

    // HTTP / URL errors (C13)
    #[error("{source}")]
    UrlParse {
        #[from]
        source: ParseError,
    },

    #[error("invalid scheme in WebSocket URL, expected ws or wss")]
    InvalidSchemeURL,

    #[error("URL has no host")]
    URLNoHost,

    #[error("{source}")]
    HttpParse {
        #[from]
        source: HttpParseError,
    },

    #[error("incomplete HTTP request")]
    IncompleteHTTPRequest,

    #[error("{source}")]
    Domain {
        #[from]
        source: InvalidDnsNameError,
    },
}

impl From<CloseError> for Error {
    fn from(value: CloseError) -> Self {
        Error::Close(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_error_display_delegates_to_close_error() {
        let err = Error::from(CloseError::new(1006, ""));
        assert_eq!(err.to_string(), "websocket: close 1006 (abnormal closure)");
    }
}
