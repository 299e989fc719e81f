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

//! Service-side command endpoint.
//!
//! The command server accepts short-lived request/response connections:
//! each accepted connection carries exactly one encoded request, receives
//! exactly one encoded reply, and is closed. Request handling is delegated
//! to a [`RequestHandler`] implementation; the server itself only moves
//! bytes.

use crate::codec::{Message, MessageReader};
use crate::endpoint::Endpoint;
use crate::error::TellcoreError;
use crate::transport::{Connection, ConnectionAcceptor};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long one connection may take to deliver its request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Application-level request handling plugged into a [`CommandServer`].
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Produces the reply for one decoded request.
    ///
    /// The reader is positioned at the start of the request's arguments.
    /// Whatever this returns is encoded and written back verbatim; protocol
    /// errors are expressed as reply content, not as connection drops.
    async fn handle(&self, request: MessageReader) -> Message;
}

/// Accepts command connections and runs each request through a handler.
pub struct CommandServer {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    endpoint: Endpoint,
}

impl CommandServer {
    /// Binds the command endpoint and starts accepting requests.
    ///
    /// # Errors
    ///
    /// Returns the underlying bind failure.
    pub async fn start(
        endpoint: Endpoint,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<Self, TellcoreError> {
        let mut acceptor = ConnectionAcceptor::bind(endpoint).await?;
        let endpoint = acceptor.local_endpoint().clone();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    accepted = acceptor.accept() => match accepted {
                        Some(connection) => {
                            let handler = Arc::clone(&handler);
                            tokio::spawn(serve_one(connection, handler));
                        }
                        None => break,
                    },
                }
            }
            acceptor.shutdown().await;
            debug!("command server stopped");
        });

        Ok(Self {
            shutdown_tx,
            task,
            endpoint,
        })
    }

    /// The endpoint the server is listening on.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Stops accepting and joins the accept loop. Connections already being
    /// served run to completion on their own tasks.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

async fn serve_one(mut connection: Connection, handler: Arc<dyn RequestHandler>) {
    let request = connection.read(REQUEST_TIMEOUT).await;
    if request.is_empty() {
        debug!("command connection closed without a request");
        connection.close().await;
        return;
    }
    let reply = handler.handle(MessageReader::new(request)).await;
    if let Err(error) = connection.write(&reply.encode()).await {
        warn!(%error, "failed to write command reply");
    }
    connection.close().await;
}
