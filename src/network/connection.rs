//! Connection Handler
//!
//! One TCP connection scoped to a single call or notification.

use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::ClientConfig;
use crate::error::{KvRpcError, Result};
use crate::protocol::{read_frame, write_frame, CallFrame, ResponseFrame};

/// A connection to the RPC server
///
/// The socket is shut down when the connection is closed or dropped, so every
/// exit path out of a call releases it.
pub struct Connection {
    /// TCP stream to the server
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,

    /// Bytes requested per receive
    chunk_size: usize,

    /// Upper bound on an assembled response
    max_response_size: usize,

    closed: bool,
}

impl Connection {
    /// Open a connection to the configured server
    ///
    /// Every resolved address is tried in turn; the last failure is reported.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let addr = config.server_addr.as_str();
        let connect_error = |source| KvRpcError::Connect {
            addr: addr.to_string(),
            source,
        };

        let socket_addrs = addr.to_socket_addrs().map_err(connect_error)?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
                None => TcpStream::connect(socket_addr),
            };
            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", socket_addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(connect_error(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address did not resolve to any socket address",
            )
        })))
    }

    /// Wrap an already connected stream
    ///
    /// Sets up timeouts and disables Nagle's algorithm.
    pub fn from_stream(stream: TcpStream, config: &ClientConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        tracing::debug!("Connection established to {}", peer_addr);

        Ok(Self {
            stream,
            peer_addr,
            chunk_size: config.recv_chunk_size,
            max_response_size: config.max_response_size,
            closed: false,
        })
    }

    /// Send a call frame
    pub fn send(&mut self, frame: &CallFrame) -> Result<()> {
        write_frame(&mut self.stream, frame)
    }

    /// Block until a complete response frame arrives
    pub fn receive(&mut self) -> Result<ResponseFrame> {
        read_frame(&mut self.stream, self.chunk_size, self.max_response_size)
    }

    /// Release the connection
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // The peer may already be gone
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of connection to {} failed: {}", self.peer_addr, e);
        }
        tracing::debug!("Connection to {} closed", self.peer_addr);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
