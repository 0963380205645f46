//! Protocol layer for RoChat
//!
//! Shared domain types, the JSON text-frame wire codec, and the constants
//! that govern client behavior. This crate is pure data: no I/O, no runtime
//! dependency, usable from both the connection manager and the application
//! layer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod constants;

mod error;
mod message;
mod wire;

pub use error::ProtocolError;
pub use message::ChatMessage;
pub use wire::WireFrame;
