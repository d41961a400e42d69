//! PostgreSQL pgoutput protocol
//!
//! Message types, the decoder, and the framing used for captured streams.

pub mod decoder;
pub mod frame;
pub mod message;

pub use decoder::*;
pub use frame::*;
pub use message::*;
