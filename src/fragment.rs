//! The fragmenter, component C5.

use crate::builder::build_data_frame;
use crate::frame::{Frame, OpCode};

/// Frames larger than this are split into a head frame plus continuations.
///
/// Fixed at the 16-bit extended-length boundary (§4.4, §9) rather than
/// user-configurable: every fragment's header stays in the 2/4/6-byte
/// range and never needs the 64-bit length form.
pub const FRAGMENT_SIZE: usize = 65535;

/// Splits `payload` into one or more frames carrying opcode `op` on the
/// first frame and `Continuation` on the rest, with `fin` set only on the
/// last. Payloads at or under [`FRAGMENT_SIZE`] come back as a single frame.
pub fn fragment(payload: Vec<u8>, op: OpCode, no_mask: bool) -> Vec<Frame> {
    if payload.len() <= FRAGMENT_SIZE {
        return vec![build_data_frame(payload, no_mask, op)];
    }

    let mut frames = Vec::with_capacity(payload.len() / FRAGMENT_SIZE + 1);
    let mut chunks = payload.chunks(FRAGMENT_SIZE).peekable();
    let mut first = true;

    while let Some(chunk) = chunks.next() {
        let opcode = if first { op } else { OpCode::Continuation };
        let is_last = chunks.peek().is_none();
        let mut frame = build_data_frame(chunk.to_vec(), no_mask, opcode);
        frame.fin = is_last;
        frames.push(frame);
        first = false;
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_payload_is_a_single_frame() {
        let frames = fragment(vec![0u8; 100], OpCode::Text, true);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fin);
        assert_eq!(frames[0].opcode, OpCode::Text);
    }

    #[test]
    fn exact_multiple_has_no_zero_length_trailer() {
        let frames = fragment(vec![0u8; 2 * FRAGMENT_SIZE], OpCode::Text, true);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].payload.len(), FRAGMENT_SIZE);
        assert_eq!(frames[1].payload.len(), FRAGMENT_SIZE);
        assert_eq!(
            frames.iter().map(|f| f.opcode).collect::<Vec<_>>(),
            vec![OpCode::Text, OpCode::Continuation]
        );
        assert_eq!(
            frames.iter().map(|f| f.fin).collect::<Vec<_>>(),
            vec![false, true]
        );
    }

    #[test]
    fn remainder_forms_a_third_frame() {
        let frames = fragment(vec![0u8; 2 * FRAGMENT_SIZE + 20], OpCode::Text, true);
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames.iter().map(|f| f.payload.len()).collect::<Vec<_>>(),
            vec![FRAGMENT_SIZE, FRAGMENT_SIZE, 20]
        );
        assert_eq!(
            frames.iter().map(|f| f.opcode).collect::<Vec<_>>(),
            vec![OpCode::Text, OpCode::Continuation, OpCode::Continuation]
        );
        assert_eq!(
            frames.iter().map(|f| f.fin).collect::<Vec<_>>(),
            vec![false, false, true]
        );
    }

    #[test]
    fn each_fragment_draws_its_own_masking_key() {
        let frames = fragment(vec![7u8; 2 * FRAGMENT_SIZE], OpCode::Binary, false);
        assert_ne!(frames[0].mask, frames[1].mask);
    }
}
