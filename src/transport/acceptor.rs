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

//! Service-side connection acceptor.
//!
//! Binds an [`Endpoint`] and hands each accepted peer connection off exactly
//! once. Local endpoints are created world-read/write/executable so any
//! local process may connect — the deliberate trust boundary of this system
//! — and the stale socket file from a previous run is removed before
//! binding. TCP endpoints are bound with address reuse.
//!
//! The accept loop runs as its own task and multiplexes a shutdown signal
//! with listener readiness; pending connections beyond one acceptance per
//! iteration sit in the platform listen backlog.

use crate::endpoint::Endpoint;
use crate::transport::{Connection, TransportError};
use std::fs;
use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tokio::net::{TcpListener, TcpSocket, UnixListener};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Listen backlog for pending connections.
const LISTEN_BACKLOG: u32 = 5;

enum Listener {
    Local(UnixListener, PathBuf),
    Tcp(TcpListener),
}

impl Listener {
    async fn accept_one(&self) -> std::io::Result<Connection> {
        match self {
            Self::Local(listener, _) => {
                let (stream, _) = listener.accept().await?;
                Ok(Connection::from_unix(stream))
            }
            Self::Tcp(listener) => {
                let (stream, _) = listener.accept().await?;
                Ok(Connection::from_tcp(stream))
            }
        }
    }
}

/// Accepts incoming peer connections on a bound endpoint.
///
/// Each accepted [`Connection`] is published exactly once and retrieved
/// through [`accept`](ConnectionAcceptor::accept). Dropping or
/// [`shutdown`](ConnectionAcceptor::shutdown)-ing the acceptor stops the
/// loop, releases the listener, and unlinks the socket file of a local
/// endpoint.
pub struct ConnectionAcceptor {
    accepted_rx: mpsc::Receiver<Connection>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    local_endpoint: Endpoint,
}

impl ConnectionAcceptor {
    /// Binds the endpoint and starts the accept loop.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] when the endpoint cannot be
    /// bound or listened on. Bind failures are not retried.
    pub async fn bind(endpoint: Endpoint) -> Result<Self, TransportError> {
        let listener = match &endpoint {
            Endpoint::Local(path) => {
                // A stale socket file from an unclean shutdown blocks bind.
                if path.exists() {
                    let _ = fs::remove_file(path);
                }
                let listener =
                    UnixListener::bind(path).map_err(|source| TransportError::BindFailed {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;
                fs::set_permissions(path, fs::Permissions::from_mode(0o777)).map_err(
                    |source| TransportError::BindFailed {
                        endpoint: endpoint.to_string(),
                        source,
                    },
                )?;
                Listener::Local(listener, path.clone())
            }
            Endpoint::Tcp(addr) => {
                let socket = match addr {
                    SocketAddr::V4(_) => TcpSocket::new_v4(),
                    SocketAddr::V6(_) => TcpSocket::new_v6(),
                }?;
                socket.set_reuseaddr(true)?;
                socket
                    .bind(*addr)
                    .map_err(|source| TransportError::BindFailed {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;
                let listener =
                    socket
                        .listen(LISTEN_BACKLOG)
                        .map_err(|source| TransportError::BindFailed {
                            endpoint: endpoint.to_string(),
                            source,
                        })?;
                Listener::Tcp(listener)
            }
        };

        // With a requested port of 0 the kernel picks one; report the real
        // listen address back to the owner.
        let local_endpoint = match &listener {
            Listener::Local(_, path) => Endpoint::Local(path.clone()),
            Listener::Tcp(l) => Endpoint::Tcp(l.local_addr()?),
        };
        info!(endpoint = %local_endpoint, "listening");

        let (accepted_tx, accepted_rx) = mpsc::channel(LISTEN_BACKLOG as usize);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let loop_endpoint = local_endpoint.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    accepted = listener.accept_one() => match accepted {
                        Ok(connection) => {
                            debug!(endpoint = %loop_endpoint, "accepted connection");
                            if accepted_tx.send(connection).await.is_err() {
                                // Owner gone; nothing left to hand off to.
                                break;
                            }
                        }
                        Err(error) => {
                            warn!(endpoint = %loop_endpoint, %error, "accept failed");
                        }
                    },
                }
            }
            if let Listener::Local(_, path) = &listener {
                let _ = fs::remove_file(path);
            }
            debug!(endpoint = %loop_endpoint, "acceptor stopped");
        });

        Ok(Self {
            accepted_rx,
            shutdown_tx,
            task,
            local_endpoint,
        })
    }

    /// Waits for the next accepted connection.
    ///
    /// Returns `None` once the accept loop has stopped.
    pub async fn accept(&mut self) -> Option<Connection> {
        self.accepted_rx.recv().await
    }

    /// The endpoint actually bound (with the kernel-assigned port for TCP
    /// binds requesting port 0).
    pub fn local_endpoint(&self) -> &Endpoint {
        &self.local_endpoint
    }

    /// Stops the accept loop, releases the listener, and unlinks a local
    /// socket path.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}
