//! The one-way channel from a reflection process back to its parent.
//!
//! The transport is a loopback TCP connection. The parent listens, the child
//! connects, presents a [`Handshake`] carrying the per-invocation token, sends
//! at most one [`Message`] and closes its write half.

use super::{
    PROTOCOL_VERSION,
    frame::{read_frame, read_frame_limited, write_frame},
    message::{Handshake, Message},
};
use crate::{
    config::{CHANNEL_ENV, CHANNEL_TOKEN_ENV, ReflectionConfig},
    error::{Error, Result},
};
use std::io::{self, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Anything a reflection process can deliver its terminal message through.
pub trait Channel {
    fn send(&mut self, message: &Message) -> Result<()>;
}

/// Child end of the loopback channel.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    sent: bool,
}

impl TcpChannel {
    /// Connect to the parent named in the configuration.
    ///
    /// A missing address or token, or a refused connection, means there is no
    /// channel at all; callers treat that as fatal.
    pub fn connect(config: &ReflectionConfig) -> Result<Self> {
        let addr = config
            .channel
            .as_deref()
            .ok_or_else(|| Error::ChannelUnavailable(format!("{CHANNEL_ENV} is not set")))?;
        let token = config
            .channel_token
            .as_deref()
            .ok_or_else(|| Error::ChannelUnavailable(format!("{CHANNEL_TOKEN_ENV} is not set")))?;

        let mut stream = TcpStream::connect(addr)
            .map_err(|e| Error::ChannelUnavailable(format!("cannot connect to {addr}: {e}")))?;
        write_frame(&mut stream, &Handshake::new(token))
            .map_err(|e| Error::ChannelUnavailable(format!("handshake with {addr} failed: {e}")))?;

        debug!("Connected reflection channel to {}", addr);
        Ok(Self {
            stream,
            sent: false,
        })
    }

    /// Flush and close the write half so the parent sees end of stream.
    pub fn close(mut self) -> Result<()> {
        self.stream.flush()?;
        match self.stream.shutdown(Shutdown::Write) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Channel for TcpChannel {
    fn send(&mut self, message: &Message) -> Result<()> {
        if self.sent {
            return Err(Error::ProtocolError(
                "a terminal message was already sent on this channel".to_string(),
            ));
        }
        write_frame(&mut self.stream, message)
            .map_err(|e| Error::ChannelUnavailable(format!("failed to send message: {e}")))?;
        self.sent = true;
        debug!("Sent {} message to parent", message.kind());
        Ok(())
    }
}

/// Records every message in memory.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    messages: Vec<Message>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, message: &Message) -> Result<()> {
        // Same encoding as the wire, so non-serializable payloads fail here too.
        let mut buf = Vec::new();
        write_frame(&mut buf, message)?;
        self.messages.push(message.clone());
        Ok(())
    }
}

/// How long an accepted connection gets to present its handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(500);
/// A handshake is a version and a 32-character token; anything longer is not one.
const MAX_HANDSHAKE_SIZE: usize = 1024;

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A token unique to one reflection invocation.
pub fn generate_token(addr: &SocketAddr) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = format!("{}:{}:{}:{}", std::process::id(), addr, nanos, seq);
    format!("{:x}", md5::compute(seed.as_bytes()))
}

/// Parent end of the loopback channel.
#[derive(Debug)]
pub struct ChannelListener {
    listener: TcpListener,
    address: SocketAddr,
    token: String,
}

impl ChannelListener {
    pub fn bind() -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;
        let token = generate_token(&address);
        Ok(Self {
            listener,
            address,
            token,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Accept a pending connection that presents this listener's token.
    ///
    /// Returns `Ok(None)` when nothing is waiting. Connections with a wrong,
    /// oversized or missing handshake are dropped after at most
    /// [`HANDSHAKE_TIMEOUT`].
    pub fn try_accept(&self) -> Result<Option<ChannelReader>> {
        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            // Some platforms hand out accepted sockets in non-blocking mode.
            stream.set_nonblocking(false)?;
            let mut reader = ChannelReader { stream };
            match reader.read_handshake() {
                Ok(Some(handshake)) if handshake.token == self.token => {
                    if handshake.protocol_version != PROTOCOL_VERSION {
                        return Err(Error::ProtocolError(format!(
                            "protocol version mismatch: expected {}, got {}",
                            PROTOCOL_VERSION, handshake.protocol_version
                        )));
                    }
                    debug!("Accepted reflection channel from {}", peer);
                    return Ok(Some(reader));
                }
                Ok(Some(_)) => warn!("Dropping channel connection from {} with a wrong token", peer),
                Ok(None) => warn!("Dropping channel connection from {} without a handshake", peer),
                Err(e) => warn!("Dropping channel connection from {}: {}", peer, e),
            }
        }
    }
}

/// Reads frames from an accepted channel connection.
#[derive(Debug)]
pub struct ChannelReader {
    stream: TcpStream,
}

impl ChannelReader {
    fn read_handshake(&mut self) -> Result<Option<Handshake>> {
        self.set_timeout(HANDSHAKE_TIMEOUT)?;
        read_frame_limited(&mut self.stream, MAX_HANDSHAKE_SIZE).map_err(frame_error)
    }

    /// Read the terminal message; `Ok(None)` if the child closed without one.
    pub fn read_message(&mut self, timeout: Duration) -> Result<Option<Message>> {
        self.set_timeout(timeout)?;
        read_frame(&mut self.stream).map_err(frame_error)
    }

    fn set_timeout(&self, timeout: Duration) -> Result<()> {
        // A zero read timeout is rejected by the OS.
        let timeout = timeout.max(Duration::from_millis(1));
        self.stream.set_read_timeout(Some(timeout))?;
        Ok(())
    }
}

fn frame_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Error::Timeout("waiting for a frame from the reflection process".to_string())
        }
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            Error::ProtocolError(e.to_string())
        }
        _ => Error::IoError(e),
    }
}
