//! The connection engine, components C6 and C9: the per-connection state
//! machine that reads frames, reassembles fragments, answers control frames
//! inline, and drives the close handshake (§4.5).

use crate::builder::{build_control_frame, build_data_frame};
use crate::close::CloseError;
use crate::decoder::parse_header;
use crate::encoder::encode;
use crate::error::Error;
use crate::fragment::fragment;
use crate::frame::{Frame, OpCode};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Connecting,
    Connected,
    Closing,
    Closed,
}

type PongHandler = Box<dyn FnMut(Vec<u8>) + Send>;

/// A single WebSocket connection over any `AsyncRead + AsyncWrite` stream.
///
/// `is_server` fixes the masking direction for the whole connection's
/// lifetime (§4.6): a server-owned connection expects masked reads and
/// sends unmasked frames, a client-owned one is the reverse.
pub struct WebSocket<S> {
    reader: BufReader<tokio::io::ReadHalf<S>>,
    writer: Arc<Mutex<BufWriter<tokio::io::WriteHalf<S>>>>,
    is_server: bool,
    state: ConnState,
    fragment_buf: Option<(OpCode, Vec<u8>)>,
    pong_handler: Option<PongHandler>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> WebSocket<S> {
    /// Wraps an already-upgraded stream. Callers go through
    /// [`crate::client::connect`] or [`crate::server::accept`] rather than
    /// this directly, since those drive the HTTP handshake first.
    pub fn new(stream: S, is_server: bool) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: Arc::new(Mutex::new(BufWriter::new(write_half))),
            is_server,
            state: ConnState::Connected,
            fragment_buf: None,
            pong_handler: None,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Installs a callback invoked inline with a pong frame's payload.
    /// Must be non-blocking (§4.9 design note).
    pub fn set_pong_handler(&mut self, handler: impl FnMut(Vec<u8>) + Send + 'static) {
        self.pong_handler = Some(Box::new(handler));
    }

    /// Awaits until a complete application message (text or binary) has
    /// been assembled, handling interleaved control frames along the way.
    pub async fn read_message(&mut self) -> Result<(OpCode, Vec<u8>), Error> {
        loop {
            let frame = match self.read_frame().await {
                Ok(frame) => frame,
                Err(err) => {
                    self.state = ConnState::Closed;
                    return Err(err);
                }
            };

            match frame.opcode {
                OpCode::Text | OpCode::Binary => {
                    if frame.fin {
                        if self.fragment_buf.is_some() {
                            return Err(Error::FragmentedInProgress);
                        }
                        if frame.opcode == OpCode::Text {
                            std::str::from_utf8(&frame.payload)?;
                        }
                        return Ok((frame.opcode, frame.payload));
                    }
                    if self.fragment_buf.is_some() {
                        return Err(Error::FragmentedInProgress);
                    }
                    self.fragment_buf = Some((frame.opcode, frame.payload));
                }
                OpCode::Continuation => {
                    let (op, mut buf) = self.fragment_buf.take().ok_or(Error::InvalidContinuation)?;
                    buf.extend_from_slice(&frame.payload);
                    if frame.fin {
                        if op == OpCode::Text {
                            std::str::from_utf8(&buf)?;
                        }
                        return Ok((op, buf));
                    }
                    self.fragment_buf = Some((op, buf));
                }
                OpCode::Ping => {
                    self.write_control(OpCode::Pong, frame.payload).await?;
                }
                OpCode::Pong => {
                    if let Some(handler) = self.pong_handler.as_mut() {
                        handler(frame.payload);
                    }
                }
                OpCode::Close => {
                    let close_err = CloseError::from_payload(&frame.payload);
                    self.state = ConnState::Closed;
                    return Err(Error::Close(close_err));
                }
            }
        }
    }

    /// Reads and fully decodes one frame off the wire (§4.5 "Read one
    /// frame"), enforcing the masking-direction rule and payload validity.
    async fn read_frame(&mut self) -> Result<Frame, Error> {
        let mut header_bytes = [0u8; 2];
        if let Err(err) = self.reader.read_exact(&mut header_bytes).await {
            return Err(close_on_eof(err));
        }
        let header = parse_header(header_bytes)?;

        let mut len = header.len_code as u64;
        if header.len_code == 126 {
            let mut ext = [0u8; 2];
            self.reader.read_exact(&mut ext).await.map_err(close_on_eof)?;
            len = u16::from_be_bytes(ext) as u64;
        } else if header.len_code == 127 {
            let mut ext = [0u8; 8];
            self.reader.read_exact(&mut ext).await.map_err(close_on_eof)?;
            len = u64::from_be_bytes(ext);
        }

        if self.is_server && !header.masked {
            return Err(Error::MaskNotSet);
        }
        if !self.is_server && header.masked {
            return Err(Error::MaskSet);
        }

        let mask = if header.masked {
            let mut key_bytes = [0u8; 4];
            self.reader.read_exact(&mut key_bytes).await.map_err(close_on_eof)?;
            Some(u32::from_be_bytes(key_bytes))
        } else {
            None
        };

        let mut payload = vec![0u8; len as usize];
        self.reader.read_exact(&mut payload).await.map_err(close_on_eof)?;
        if let Some(key) = mask {
            crate::mask::mask_payload(&mut payload, key);
        }

        let frame = Frame {
            fin: header.fin,
            rsv1: header.rsv1,
            rsv2: header.rsv2,
            rsv3: header.rsv3,
            opcode: header.opcode,
            mask,
            payload,
        };

        if let Err(err) = frame.valid() {
            self.send_close_frame(1002, "protocol error").await.ok();
            return Err(err);
        }

        Ok(frame)
    }

    /// Sends `text` as one or more text-opcode frames, fragmenting per §4.4
    /// when the payload exceeds 65535 bytes.
    pub async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.send_data(text.as_bytes().to_vec(), OpCode::Text).await
    }

    /// Sends `data` as one or more binary-opcode frames.
    pub async fn send_binary(&mut self, data: &[u8]) -> Result<(), Error> {
        self.send_data(data.to_vec(), OpCode::Binary).await
    }

    async fn send_data(&mut self, payload: Vec<u8>, opcode: OpCode) -> Result<(), Error> {
        if self.state != ConnState::Connected {
            return Err(Error::InvalidState);
        }
        let frames = fragment(payload, opcode, self.is_server);
        let mut writer = self.writer.lock().await;
        for frame in &frames {
            writer.write_all(&encode(frame)).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    /// Sends a ping frame with payload `"ping"` (§6).
    pub async fn send_ping(&mut self) -> Result<(), Error> {
        if self.state != ConnState::Connected {
            return Err(Error::InvalidState);
        }
        self.write_control(OpCode::Ping, b"ping".to_vec()).await
    }

    async fn write_control(&mut self, opcode: OpCode, payload: Vec<u8>) -> Result<(), Error> {
        let frame = build_control_frame(opcode, self.is_server, payload)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(&encode(&frame)).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn send_close_frame(&mut self, code: u16, text: &str) -> Result<(), Error> {
        let close_err = CloseError::new(code, text);
        self.write_control(OpCode::Close, close_err.to_payload()).await
    }

    /// Initiates local close with code 1006 (§4.5), flushes the close frame,
    /// and shuts down the underlying stream's write half.
    pub async fn close(&mut self) -> Result<(), Error> {
        self.state = ConnState::Closing;
        self.send_close_frame(1006, "abnormal closure").await?;
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        drop(writer);
        self.state = ConnState::Closed;
        Ok(())
    }
}

fn close_on_eof(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Close(CloseError::new(1006, "unexpected EOF"))
    } else {
        Error::Io { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_data_frame;

    #[tokio::test]
    async fn echoes_a_single_frame_message() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut server = WebSocket::new(server_io, true);
        let mut client = WebSocket::new(client_io, false);

        tokio::spawn(async move {
            server.send_text("hello").await.unwrap();
        });

        let (opcode, payload) = client.read_message().await.unwrap();
        assert_eq!(opcode, OpCode::Text);
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn reassembles_a_fragmented_message() {
        let (client_io, server_io) = tokio::io::duplex(1 << 20);
        let mut server = WebSocket::new(server_io, true);
        let mut client = WebSocket::new(client_io, false);

        let payload = vec![7u8; 200_000];
        let payload_clone = payload.clone();
        tokio::spawn(async move {
            server.send_binary(&payload_clone).await.unwrap();
        });

        let (opcode, received) = client.read_message().await.unwrap();
        assert_eq!(opcode, OpCode::Binary);
        assert_eq!(received.len(), 200_000);
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn ping_triggers_automatic_pong() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut server = WebSocket::new(server_io, true);
        let mut client = WebSocket::new(client_io, false);

        server.send_ping().await.unwrap();

        // The client's read loop answers the ping inline (writing a pong)
        // before this call would ever see a data frame to return, so run it
        // on its own task and give it a beat to do that inline write.
        let client_task = tokio::spawn(async move {
            let _ = tokio::time::timeout(std::time::Duration::from_millis(200), client.read_message()).await;
        });

        let (opcode, payload) = server.read_message().await.unwrap();
        assert_eq!(opcode, OpCode::Pong);
        assert_eq!(payload, b"ping");

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn close_handshake_surfaces_code_and_label() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut server = WebSocket::new(server_io, true);
        let mut client = WebSocket::new(client_io, false);

        tokio::spawn(async move {
            server.close().await.unwrap();
        });

        let err = client.read_message().await.unwrap_err();
        match err {
            Error::Close(close_err) => {
                assert_eq!(close_err.code, 1006);
                assert_eq!(close_err.to_string(), "websocket: close 1006 (abnormal closure)");
            }
            other => panic!("expected Error::Close, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn protocol_violation_closes_with_1002() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut client = WebSocket::new(client_io, false);
        let mut server_writer = server_io;

        let mut bad_frame = build_data_frame(b"x".to_vec(), true, OpCode::Text);
        bad_frame.rsv1 = true;
        let bytes = encode(&bad_frame);
        tokio::spawn(async move {
            AsyncWriteExt::write_all(&mut server_writer, &bytes).await.unwrap();
        });

        let err = client.read_message().await.unwrap_err();
        assert!(matches!(err, Error::RsvNotZero));
    }

    #[tokio::test]
    async fn invalid_utf8_text_frame_is_rejected() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut client = WebSocket::new(client_io, false);
        let mut server_writer = server_io;

        let bad_frame = build_data_frame(vec![0xff, 0xfe], true, OpCode::Text);
        let bytes = encode(&bad_frame);
        tokio::spawn(async move {
            AsyncWriteExt::write_all(&mut server_writer, &bytes).await.unwrap();
        });

        let err = client.read_message().await.unwrap_err();
        assert!(matches!(err, Error::Utf8 { .. }));
    }
}
