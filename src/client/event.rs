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

//! Persistent event stream from the service.
//!
//! The event client owns one long-lived [`Connection`] to the service's
//! event endpoint and keeps it alive for the lifetime of the owning process:
//! unlike the one-shot request path there is no retry bound — on any
//! transport failure it waits a fixed delay and reconnects, indefinitely.
//! A subscriber simply misses whatever the hub broadcast while it was
//! disconnected.
//!
//! Reads are bounded so the loop can re-check its run flag; the shutdown
//! signal is multiplexed into every wait, so stop latency is bounded by the
//! read timeout rather than indefinite.

use crate::client::dispatcher::EventSink;
use crate::codec::MessageReader;
use crate::endpoint::Endpoint;
use crate::events::EventRecord;
use crate::transport::Connection;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

/// Delay between reconnect attempts while the service is unreachable.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Bounded wait for one read while connected.
pub const DEFAULT_READ_WAIT: Duration = Duration::from_secs(1);

/// Background reader of the service's event stream.
///
/// Each fully decoded message is converted into an [`EventRecord`] and
/// published through the given [`EventSink`]; an unrecognized tag discards
/// the remainder of that read (permissive decoding).
pub struct EventClient {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl EventClient {
    /// Starts the read loop against the event endpoint with default timing.
    pub fn start(endpoint: Endpoint, sink: EventSink) -> Self {
        Self::start_with_timing(endpoint, sink, DEFAULT_RECONNECT_DELAY, DEFAULT_READ_WAIT)
    }

    /// Starts the read loop with explicit reconnect delay and read wait.
    /// Mainly for tests.
    pub fn start_with_timing(
        endpoint: Endpoint,
        sink: EventSink,
        reconnect_delay: Duration,
        read_wait: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            endpoint,
            sink,
            reconnect_delay,
            read_wait,
            shutdown_rx,
        ));
        Self { shutdown_tx, task }
    }

    /// Stops the read loop, interrupting a pending read, and joins it.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run_loop(
    endpoint: Endpoint,
    sink: EventSink,
    reconnect_delay: Duration,
    read_wait: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut connection = Connection::new();
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        if !connection.is_connected() {
            connection.connect(&endpoint).await;
            if !connection.is_connected() {
                debug!(%endpoint, "event endpoint unreachable, waiting to retry");
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = sleep(reconnect_delay) => continue,
                }
            }
            info!(%endpoint, "event stream connected");
        }

        let chunk = tokio::select! {
            _ = shutdown_rx.changed() => break,
            chunk = connection.read(read_wait) => chunk,
        };
        if chunk.is_empty() {
            // Timeout ("nothing yet") or a drop; liveness is re-checked at
            // the top of the loop.
            continue;
        }

        let mut reader = MessageReader::new(chunk);
        while !reader.is_empty() {
            match EventRecord::decode(&mut reader) {
                Some(record) => {
                    if !sink.publish(record) {
                        // Dispatcher gone; keep the stream alive regardless.
                        break;
                    }
                }
                None => {
                    debug!("unrecognized event message, discarding rest of read");
                    break;
                }
            }
        }
    }
    connection.close().await;
    debug!(%endpoint, "event client stopped");
}
