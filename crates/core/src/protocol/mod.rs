//! Wire protocol between the parent tool and a reflection process.

pub mod channel;
pub mod frame;
pub mod message;
pub mod serialized_error;

/// Bump when the handshake or message format changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub use channel::{Channel, ChannelListener, ChannelReader, MemoryChannel, TcpChannel};
pub use message::{Handshake, Message};
pub use serialized_error::SerializedError;
