//! Frame header parsing, component C3 (read side).
//!
//! Parses only the first two header bytes; the extended length and masking
//! key are staged reads owned by the connection engine (§4.5) so it can
//! bound how much it peeks from the stream at a time.

use crate::error::Error;
use crate::frame::OpCode;

/// The fixed two-byte header, unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub fin: bool,
    pub rsv1: bool,
    pub rsv2: bool,
    pub rsv3: bool,
    pub opcode: OpCode,
    pub masked: bool,
    /// The raw 7-bit length discriminator: 0-125 literal, 126 or 127 meaning
    /// "read the next 16 or 64 bits for the actual length".
    pub len_code: u8,
}

/// Parses the two fixed header bytes per §4.2's bit layout.
pub fn parse_header(bytes: [u8; 2]) -> Result<Header, Error> {
    let fin = (bytes[0] & 0b1000_0000) != 0;
    let rsv1 = (bytes[0] & 0b0100_0000) != 0;
    let rsv2 = (bytes[0] & 0b0010_0000) != 0;
    let rsv3 = (bytes[0] & 0b0001_0000) != 0;
    let opcode = OpCode::from(bytes[0] & 0b0000_1111)?;

    let masked = (bytes[1] & 0b1000_0000) != 0;
    let len_code = bytes[1] & 0b0111_1111;

    Ok(Header {
        fin,
        rsv1,
        rsv2,
        rsv3,
        opcode,
        masked,
        len_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fin_text_unmasked_short_header() {
        let header = parse_header([0x81, 0x05]).unwrap();
        assert!(header.fin);
        assert!(!header.rsv1 && !header.rsv2 && !header.rsv3);
        assert_eq!(header.opcode, OpCode::Text);
        assert!(!header.masked);
        assert_eq!(header.len_code, 5);
    }

    #[test]
    fn parses_masked_continuation_with_extended_len_code() {
        let header = parse_header([0x00, 0xFE]).unwrap();
        assert!(!header.fin);
        assert_eq!(header.opcode, OpCode::Continuation);
        assert!(header.masked);
        assert_eq!(header.len_code, 126);
    }

    #[test]
    fn rejects_reserved_opcode() {
        assert!(parse_header([0x83, 0x00]).is_err());
    }
}
