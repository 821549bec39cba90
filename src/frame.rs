//! The in-memory frame record (RFC 6455 §5.2), component C1.

use crate::error::Error;

/// The four-bit opcode naming a frame's payload interpretation.
///
/// Values 3-7 and 11-15 are reserved by the RFC and are never constructed;
/// `OpCode::from` rejects them rather than accepting an arbitrary integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl OpCode {
    pub fn from(byte: u8) -> Result<Self, Error> {
        match byte {
            0x0 => Ok(OpCode::Continuation),
            0x1 => Ok(OpCode::Text),
            0x2 => Ok(OpCode::Binary),
            0x8 => Ok(OpCode::Close),
            0x9 => Ok(OpCode::Ping),
            0xA => Ok(OpCode::Pong),
            _ => Err(Error::InvalidOpcode),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, OpCode::Text | OpCode::Binary)
    }
}

/// One WebSocket frame.
///
/// `payload` always holds the application-level (plaintext) bytes. `mask`
/// records the key that is, or was, applied on the wire; the XOR transform
/// itself happens transiently in the codec (encode) or the connection engine
/// (decode), never by mutating a `Frame` held by the caller.
#[derive(Debug, Clone)]
pub struct Frame {
    pub fin: bool,
    pub rsv1: bool,
    pub rsv2: bool,
    pub rsv3: bool,
    pub opcode: OpCode,
    pub mask: Option<u32>,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(fin: bool, opcode: OpCode, mask: Option<u32>, payload: Vec<u8>) -> Self {
        Self {
            fin,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode,
            mask,
            payload,
        }
    }

    /// Validates the invariants from §3: reserved bits clear, masking key
    /// not the all-zero sentinel, control frames unfragmented and small.
    ///
    /// Every failure allocates its own fresh `Error` value.
    pub fn valid(&self) -> Result<(), Error> {
        if self.rsv1 || self.rsv2 || self.rsv3 {
            return Err(Error::RsvNotZero);
        }

        if matches!(self.mask, Some(0)) {
            return Err(Error::MaskKeyZero);
        }

        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::ControlFrameFragmented);
            }
            if self.payload.len() > 125 {
                return Err(Error::ControlFramePayloadSize);
            }
        }

        Ok(())
    }
}
