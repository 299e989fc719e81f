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

//! Serialized delivery of event records to user-registered handlers.
//!
//! The dispatcher decouples event production (the network-reading task) from
//! event consumption (user code): [`publish`](CallbackDispatcher::publish)
//! enqueues and returns immediately, while a single worker task dequeues one
//! record at a time and invokes every matching handler in registration order
//! before touching the next record. User handlers are therefore never
//! invoked concurrently with each other.
//!
//! The worker holds the registration table lock across each delivery pass,
//! so once [`unregister`](CallbackDispatcher::unregister) returns, no
//! further invocation of that handler begins; an in-flight invocation is
//! allowed to complete first. The cost of that guarantee is that handlers
//! must not call [`register`](CallbackDispatcher::register) or
//! [`unregister`](CallbackDispatcher::unregister) on their own dispatcher —
//! doing so deadlocks the worker. Publishing from inside a handler is fine.
//! Handler panics are caught and logged; they stop neither the worker nor
//! delivery of subsequent records.

use crate::events::{EventKind, EventRecord};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// A user-registered event handler.
///
/// Handler context lives in the closure's captured state; handlers run on
/// the dispatcher worker and must not block it for long.
pub type EventHandler = Arc<dyn Fn(&EventRecord) + Send + Sync + 'static>;

/// Identifier of one callback registration.
///
/// Ids are assigned monotonically and never reused while any registration
/// with that id could still be pending unregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.0)
    }
}

struct Registration {
    id: CallbackId,
    kind: EventKind,
    handler: EventHandler,
}

/// Cloneable publishing handle into a dispatcher's queue.
///
/// This is what the event client holds; it keeps no reference to the
/// registration table.
#[derive(Clone)]
pub struct EventSink {
    queue_tx: mpsc::UnboundedSender<EventRecord>,
}

impl EventSink {
    /// Enqueues a record for delivery. Returns `false` once the dispatcher
    /// has shut down.
    pub fn publish(&self, record: EventRecord) -> bool {
        self.queue_tx.send(record).is_ok()
    }
}

/// The single serialized delivery point for user-registered handlers.
pub struct CallbackDispatcher {
    registrations: Arc<Mutex<Vec<Registration>>>,
    next_id: AtomicU64,
    queue_tx: mpsc::UnboundedSender<EventRecord>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CallbackDispatcher {
    /// Starts the delivery worker.
    pub fn start() -> Self {
        let registrations: Arc<Mutex<Vec<Registration>>> = Arc::new(Mutex::new(Vec::new()));
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<EventRecord>();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let worker_registrations = Arc::clone(&registrations);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    record = queue_rx.recv() => match record {
                        Some(record) => deliver(&worker_registrations, &record),
                        None => break,
                    },
                }
            }
            debug!("callback dispatcher stopped");
        });

        Self {
            registrations,
            next_id: AtomicU64::new(1),
            queue_tx,
            shutdown_tx,
            task,
        }
    }

    /// Registers a handler for one event kind.
    ///
    /// Multiple registrations may share a kind; they are invoked in
    /// registration order.
    ///
    /// Handlers run under the registration table lock and therefore must
    /// not call `register` or [`unregister`](CallbackDispatcher::unregister)
    /// on their own dispatcher; that deadlocks the delivery worker.
    /// Publishing from inside a handler is allowed.
    pub fn register(
        &self,
        kind: EventKind,
        handler: impl Fn(&EventRecord) + Send + Sync + 'static,
    ) -> CallbackId {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Removes a registration by id.
    ///
    /// Returns `false` when no registration with that id exists. When this
    /// returns `true`, no further invocation of the removed handler begins.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Enqueues a record for delivery and returns immediately.
    ///
    /// Returns `false` once the dispatcher has shut down.
    pub fn publish(&self, record: EventRecord) -> bool {
        self.queue_tx.send(record).is_ok()
    }

    /// A cloneable publishing handle for the network-reading task.
    pub fn sink(&self) -> EventSink {
        EventSink {
            queue_tx: self.queue_tx.clone(),
        }
    }

    /// Stops the worker and joins it. Queued but undelivered records are
    /// dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

fn deliver(registrations: &Mutex<Vec<Registration>>, record: &EventRecord) {
    let registrations = registrations.lock();
    for registration in registrations.iter().filter(|r| r.kind == record.kind()) {
        let handler = Arc::clone(&registration.handler);
        if catch_unwind(AssertUnwindSafe(|| handler(record))).is_err() {
            error!(callback = %registration.id, kind = ?record.kind(), "event handler panicked");
        }
    }
}
