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

//! Service-side event hub.
//!
//! The hub owns a [`ConnectionAcceptor`] bound to the event subscription
//! endpoint and the set of live subscriber connections. Its run loop waits
//! for any of: shutdown requested, a new subscriber accepted, or a new
//! internal update published. Each published [`EventRecord`] is encoded once
//! and written to every subscriber; a subscriber whose write fails, or that
//! reports not-connected, is removed on the spot — lazy eviction, no
//! heartbeat, no per-subscriber queue. Delivery is at-most-once and
//! best-effort: a subscriber that is briefly disconnected simply misses the
//! event.

use crate::endpoint::Endpoint;
use crate::error::TellcoreError;
use crate::events::EventRecord;
use crate::transport::{Connection, ConnectionAcceptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The set of currently-connected subscriber connections.
///
/// Owned and mutated only by the hub task; membership changes only through
/// "accepted" and "write failed" transitions, so the set never holds a
/// connection known to be closed past the next broadcast.
#[derive(Default)]
pub struct SubscriberSet {
    connections: Vec<Connection>,
}

impl SubscriberSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a freshly accepted subscriber connection.
    pub fn add(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Number of subscribers currently held.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` when no subscriber is connected.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Writes the encoded record to every live subscriber, pruning dead
    /// ones.
    pub async fn broadcast(&mut self, record: &EventRecord) {
        let payload = record.encode().encode();
        let mut live = Vec::with_capacity(self.connections.len());
        for mut connection in self.connections.drain(..) {
            if !connection.is_connected() {
                debug!("dropping closed subscriber");
                continue;
            }
            match connection.write(&payload).await {
                Ok(()) => live.push(connection),
                Err(error) => {
                    warn!(%error, "subscriber write failed, evicting");
                }
            }
        }
        self.connections = live;
    }

    /// Closes every subscriber connection.
    pub async fn close_all(&mut self) {
        for connection in &mut self.connections {
            connection.close().await;
        }
        self.connections.clear();
    }
}

/// Cloneable handle for publishing internal state changes into the hub.
#[derive(Clone)]
pub struct EventPublisher {
    update_tx: mpsc::UnboundedSender<EventRecord>,
}

impl EventPublisher {
    /// Publishes one state-change record for broadcast. Returns `false`
    /// once the hub has shut down.
    pub fn publish(&self, record: EventRecord) -> bool {
        self.update_tx.send(record).is_ok()
    }
}

/// Fans internal state-change notifications out to every subscribed client.
pub struct EventHub {
    update_tx: mpsc::UnboundedSender<EventRecord>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    subscriber_count: Arc<AtomicUsize>,
    endpoint: Endpoint,
}

impl EventHub {
    /// Binds the event endpoint and starts the run loop.
    ///
    /// # Errors
    ///
    /// Returns the underlying bind failure; the hub does not retry binds.
    pub async fn start(endpoint: Endpoint) -> Result<Self, TellcoreError> {
        let mut acceptor = ConnectionAcceptor::bind(endpoint).await?;
        let endpoint = acceptor.local_endpoint().clone();

        let (update_tx, mut update_rx) = mpsc::unbounded_channel::<EventRecord>();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let subscriber_count = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&subscriber_count);
        let loop_endpoint = endpoint.clone();
        let task = tokio::spawn(async move {
            let mut subscribers = SubscriberSet::new();
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    accepted = acceptor.accept() => match accepted {
                        Some(connection) => {
                            subscribers.add(connection);
                            count.store(subscribers.len(), Ordering::Relaxed);
                            info!(endpoint = %loop_endpoint, subscribers = subscribers.len(),
                                "event subscriber connected");
                        }
                        None => break,
                    },
                    update = update_rx.recv() => match update {
                        Some(record) => {
                            subscribers.broadcast(&record).await;
                            count.store(subscribers.len(), Ordering::Relaxed);
                        }
                        None => break,
                    },
                }
            }
            acceptor.shutdown().await;
            subscribers.close_all().await;
            count.store(0, Ordering::Relaxed);
            debug!(endpoint = %loop_endpoint, "event hub stopped");
        });

        Ok(Self {
            update_tx,
            shutdown_tx,
            task,
            subscriber_count,
            endpoint,
        })
    }

    /// The endpoint the hub is listening on.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// A cloneable internal publishing handle.
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            update_tx: self.update_tx.clone(),
        }
    }

    /// Number of subscribers currently held by the run loop.
    ///
    /// Dead subscribers are only discovered during a broadcast, so the
    /// count may lag until the next publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Stops the run loop, the acceptor, and all subscriber connections.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}
