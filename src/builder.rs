//! Frame constructors, component C4.

use crate::error::Error;
use crate::frame::{Frame, OpCode};
use rand::random;

/// Builds a data frame (text, binary, or continuation).
///
/// `fin` is `true` whenever `opcode` is not `Continuation` — the fragmenter
/// (§4.4) is responsible for clearing it on non-final fragments and setting
/// it back on the last one. `no_mask` is `true` for a server send, `false`
/// for a client send, each drawing a fresh masking key when masked.
pub fn build_data_frame(payload: Vec<u8>, no_mask: bool, opcode: OpCode) -> Frame {
    let fin = !matches!(opcode, OpCode::Continuation);
    let mask = if no_mask { None } else { Some(random::<u32>()) };
    Frame::new(fin, opcode, mask, payload)
}

/// Builds a control frame (close, ping, or pong). `payload` must be at most
/// 125 bytes; callers constructing a close payload have already checked
/// this when they assembled the close reason (§4.8).
pub fn build_control_frame(opcode: OpCode, no_mask: bool, payload: Vec<u8>) -> Result<Frame, Error> {
    if payload.len() > 125 {
        return Err(Error::ControlFramePayloadSize);
    }
    let mask = if no_mask { None } else { Some(random::<u32>()) };
    Ok(Frame::new(true, opcode, mask, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_frame_continuation_has_fin_false() {
        let frame = build_data_frame(vec![1, 2, 3], true, OpCode::Continuation);
        assert!(!frame.fin);
        assert!(frame.mask.is_none());
    }

    #[test]
    fn data_frame_text_has_fin_true() {
        let frame = build_data_frame(vec![1, 2, 3], true, OpCode::Text);
        assert!(frame.fin);
    }

    #[test]
    fn client_data_frame_is_masked() {
        let frame = build_data_frame(vec![1, 2, 3], false, OpCode::Text);
        assert!(frame.mask.is_some());
    }

    #[test]
    fn control_frame_rejects_oversized_payload() {
        let result = build_control_frame(OpCode::Ping, true, vec![0u8; 126]);
        assert!(result.is_err());
    }

    #[test]
    fn control_frame_is_always_fin() {
        let frame = build_control_frame(OpCode::Close, true, Vec::new()).unwrap();
        assert!(frame.fin);
    }
}
