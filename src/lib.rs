//! An RFC 6455 WebSocket protocol implementation for clients and servers.
//!
//! This is an async library based on the tokio runtime: a connection owns
//! split, buffered halves of an `AsyncRead + AsyncWrite` stream and every
//! operation the protocol describes as blocking — reading a message,
//! sending one, the handshake — is an `async fn` that `.await`s on the
//! underlying stream. There is no internal worker thread and no background
//! event loop; the caller's own task is the suspension point.
//!
//! Dial a remote endpoint with [`client::connect`], or upgrade an inbound
//! request with [`server::accept`]/[`server::bind`]. Either path hands back
//! a [`connection::WebSocket`] exposing `read_message`/`send_text`/
//! `send_binary`/`send_ping`/`set_pong_handler`/`close`.

mod builder;
pub mod client;
pub mod close;
pub mod config;
pub mod connection;
mod decoder;
mod encoder;
pub mod error;
mod fragment;
pub mod frame;
mod handshake;
mod mask;
mod request;
pub mod server;
pub mod stream;

pub use close::CloseError;
pub use connection::{ConnState, WebSocket};
pub use error::Error;
pub use frame::{Frame, OpCode};
