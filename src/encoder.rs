//! Frame header encoding, component C3 (write side).
//!
//! Paired with [`crate::decoder`], which parses the header back off the wire.

use crate::frame::Frame;
use crate::mask::mask_payload;

/// Encodes `frame` to its exact wire representation: header, optional
/// extended length, optional masking key, then payload.
///
/// The payload-length discriminator is always recomputed from
/// `frame.payload.len()` here; it is never cached on the `Frame`.
pub fn encode(frame: &Frame) -> Vec<u8> {
    let payload_len = frame.payload.len();

    let mut first_byte = (frame.fin as u8) << 7;
    if frame.rsv1 {
        first_byte |= 0b0100_0000;
    }
    if frame.rsv2 {
        first_byte |= 0b0010_0000;
    }
    if frame.rsv3 {
        first_byte |= 0b0001_0000;
    }
    first_byte |= frame.opcode.as_u8();

    let mask_bit = if frame.mask.is_some() { 0b1000_0000 } else { 0 };

    let mut out = Vec::with_capacity(2 + 8 + 4 + payload_len);
    out.push(first_byte);

    if payload_len <= 125 {
        out.push(mask_bit | payload_len as u8);
    } else if payload_len <= 65535 {
        out.push(mask_bit | 126);
        out.extend_from_slice(&(payload_len as u16).to_be_bytes());
    } else {
        out.push(mask_bit | 127);
        out.extend_from_slice(&(payload_len as u64).to_be_bytes());
    }

    match frame.mask {
        Some(key) => {
            out.extend_from_slice(&key.to_be_bytes());
            let mut masked = frame.payload.clone();
            mask_payload(&mut masked, key);
            out.extend_from_slice(&masked);
        }
        None => out.extend_from_slice(&frame.payload),
    }

    out
}
