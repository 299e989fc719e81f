//
// Copyright 2026 the Tellcore Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! One bidirectional byte stream between two processes.
//!
//! A [`Connection`] wraps either a Unix-domain stream or a TCP stream behind
//! the same small surface: connect, bounded read, write, liveness query,
//! close. It is exclusively held by whichever component opened or accepted
//! it and carries no synchronization of its own.

use crate::endpoint::Endpoint;
use crate::transport::TransportError;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UnixStream};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Read buffer size for a single bounded read.
const READ_BUFFER_SIZE: usize = 4096;

enum Stream {
    Local(UnixStream),
    Tcp(TcpStream),
}

/// One established (or not-yet-established) bidirectional byte stream.
///
/// A failed [`connect`](Connection::connect) leaves the connection in a
/// not-connected state rather than raising; callers poll
/// [`is_connected`](Connection::is_connected) and decide whether to retry.
/// Read and write failures likewise drop the connection back to
/// not-connected.
pub struct Connection {
    stream: Option<Stream>,
}

impl Connection {
    /// Creates a connection in the not-connected state.
    pub fn new() -> Self {
        Self { stream: None }
    }

    pub(crate) fn from_unix(stream: UnixStream) -> Self {
        Self {
            stream: Some(Stream::Local(stream)),
        }
    }

    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            stream: Some(Stream::Tcp(stream)),
        }
    }

    /// Attempts to connect to the endpoint.
    ///
    /// Any previous stream is dropped first. On failure the connection is
    /// left not-connected; the failure is logged, not raised.
    pub async fn connect(&mut self, endpoint: &Endpoint) {
        self.stream = None;
        let result = match endpoint {
            Endpoint::Local(path) => UnixStream::connect(path).await.map(Stream::Local),
            Endpoint::Tcp(addr) => TcpStream::connect(addr).await.map(Stream::Tcp),
        };
        match result {
            Ok(stream) => self.stream = Some(stream),
            Err(error) => debug!(%endpoint, %error, "connect failed"),
        }
    }

    /// Returns `true` while the underlying stream is believed usable.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Reads whatever arrives within `max_wait`.
    ///
    /// Returns an empty buffer when nothing arrived in time; callers must
    /// interpret that as "nothing yet", not as a zero-length message. An
    /// end-of-stream or read error also returns empty and additionally marks
    /// the connection not-connected, which is how callers tell the two
    /// apart.
    pub async fn read(&mut self, max_wait: Duration) -> Vec<u8> {
        let Some(stream) = self.stream.as_mut() else {
            return Vec::new();
        };
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        match timeout(max_wait, read_stream(stream, &mut buffer)).await {
            Err(_) => Vec::new(),
            Ok(Ok(0)) => {
                debug!("peer closed connection");
                self.stream = None;
                Vec::new()
            }
            Ok(Ok(n)) => {
                buffer.truncate(n);
                buffer
            }
            Ok(Err(error)) => {
                warn!(%error, "read failed, dropping connection");
                self.stream = None;
                Vec::new()
            }
        }
    }

    /// Writes the whole buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] when no stream is
    /// established, or [`TransportError::WriteFailed`] on an I/O failure; in
    /// the latter case the connection is marked not-connected.
    pub async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        let result = match stream {
            Stream::Local(s) => s.write_all(data).await,
            Stream::Tcp(s) => s.write_all(data).await,
        };
        if let Err(source) = result {
            self.stream = None;
            return Err(TransportError::WriteFailed { source });
        }
        Ok(())
    }

    /// Shuts down and releases the underlying stream, if any.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = match &mut stream {
                Stream::Local(s) => s.shutdown().await,
                Stream::Tcp(s) => s.shutdown().await,
            };
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_stream(stream: &mut Stream, buffer: &mut [u8]) -> io::Result<usize> {
    match stream {
        Stream::Local(s) => s.read(buffer).await,
        Stream::Tcp(s) => s.read(buffer).await,
    }
}
