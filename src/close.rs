//! The close-error value, component C8.

use std::fmt;

/// A structured WebSocket close: numeric code plus free-text reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseError {
    pub code: u16,
    pub text: String,
}

impl CloseError {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    fn label(&self) -> Option<&'static str> {
        match self.code {
            1000 => Some("normal"),
            1001 => Some("going away"),
            1002 => Some("protocol error"),
            1003 => Some("unsupported data"),
            1005 => Some("no status"),
            1006 => Some("abnormal closure"),
            1007 => Some("invalid payload"),
            1008 => Some("policy violation"),
            1009 => Some("message too big"),
            1010 => Some("mandatory extension"),
            1011 => Some("internal server error"),
            1015 => Some("TLS handshake"),
            _ => None,
        }
    }

    /// Decodes a received close frame's payload per §4.5: the first two
    /// bytes are the code, big-endian; the rest is the UTF-8 reason.
    /// A payload shorter than 2 bytes yields code 1000 with no text.
    pub fn from_payload(payload: &[u8]) -> Self {
        if payload.len() < 2 {
            return CloseError::new(1000, "");
        }
        let code = u16::from_be_bytes([payload[0], payload[1]]);
        let text = String::from_utf8_lossy(&payload[2..]).into_owned();
        CloseError::new(code, text)
    }

    /// Encodes this close-error as a close frame payload: two big-endian
    /// code bytes followed by the UTF-8 bytes of this value's display form.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.text.len());
        out.extend_from_slice(&self.code.to_be_bytes());
        out.extend_from_slice(self.to_string().as_bytes());
        out
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "websocket: close {}", self.code)?;
        if let Some(label) = self.label() {
            write!(f, " ({})", label)?;
        }
        if !self.text.is_empty() {
            write!(f, ": {}", self.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_code_with_label() {
        let err = CloseError::new(1006, "");
        assert_eq!(err.to_string(), "websocket: close 1006 (abnormal closure)");
    }

    #[test]
    fn formats_known_code_with_label_and_text() {
        let err = CloseError::new(1002, "reserved bit is not 0");
        assert_eq!(
            err.to_string(),
            "websocket: close 1002 (protocol error): reserved bit is not 0"
        );
    }

    #[test]
    fn formats_unknown_code_without_label() {
        let err = CloseError::new(4000, "app defined");
        assert_eq!(err.to_string(), "websocket: close 4000: app defined");
    }

    #[test]
    fn short_payload_decodes_to_normal_closure() {
        let err = CloseError::from_payload(&[]);
        assert_eq!(err.code, 1000);
        assert_eq!(err.text, "");
    }

    #[test]
    fn payload_decodes_code_and_text() {
        let mut payload = 1008u16.to_be_bytes().to_vec();
        payload.extend_from_slice(b"bye");
        let err = CloseError::from_payload(&payload);
        assert_eq!(err.code, 1008);
        assert_eq!(err.text, "bye");
    }
}
