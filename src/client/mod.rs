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

//! Client-side handle to the service.
//!
//! A [`Client`] owns all per-process client state: the request transport,
//! the callback dispatcher, the background event stream (when an event
//! endpoint is configured), and the cached list iterations. It is an
//! explicit handle created by [`Client::open`] and torn down by
//! [`Client::shutdown`]; no process-wide singleton is involved.

mod dispatcher;
mod event;
mod request;

pub use dispatcher::{CallbackDispatcher, CallbackId, EventHandler, EventSink};
pub use event::{EventClient, DEFAULT_READ_WAIT, DEFAULT_RECONNECT_DELAY};
pub use request::{RequestClient, DEFAULT_ATTEMPTS, DEFAULT_BACKOFF, DEFAULT_REPLY_TIMEOUT};

use crate::codec::{Message, MessageReader};
use crate::endpoint::Endpoint;
use crate::events::{EventKind, EventRecord};
use parking_lot::Mutex;

/// Default command endpoint, reachable by any local process.
pub const DEFAULT_COMMAND_ENDPOINT: &str = "/tmp/TellcoreClient";

/// Default event subscription endpoint.
pub const DEFAULT_EVENT_ENDPOINT: &str = "/tmp/TellcoreEvents";

/// Endpoints for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where command requests are sent.
    pub command_endpoint: Endpoint,
    /// Where the event stream is subscribed; `None` starts no event loop.
    pub event_endpoint: Option<Endpoint>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command_endpoint: Endpoint::local(DEFAULT_COMMAND_ENDPOINT),
            event_endpoint: Some(Endpoint::local(DEFAULT_EVENT_ENDPOINT)),
        }
    }
}

/// One sensor entry from the service's sensor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    /// Sensor protocol name.
    pub protocol: String,
    /// Sensor model name.
    pub model: String,
    /// Sensor id within its protocol.
    pub id: i32,
    /// Bitmask of the quantities this sensor reports.
    pub data_types: i32,
}

/// One controller entry from the service's controller list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    /// The controller's id.
    pub id: i32,
    /// The controller's hardware type.
    pub controller_type: i32,
    /// Human-readable controller name.
    pub name: String,
    /// Whether the controller is currently attached.
    pub available: bool,
}

/// Per-process handle to the service.
pub struct Client {
    request: RequestClient,
    dispatcher: CallbackDispatcher,
    events: Option<EventClient>,
    sensor_cache: Mutex<Option<MessageReader>>,
    controller_cache: Mutex<Option<MessageReader>>,
}

impl Client {
    /// Opens a client handle.
    ///
    /// Starts the callback dispatcher, and — when an event endpoint is
    /// configured — the background event stream feeding it.
    pub fn open(config: ClientConfig) -> Self {
        let dispatcher = CallbackDispatcher::start();
        let events = config
            .event_endpoint
            .map(|endpoint| EventClient::start(endpoint, dispatcher.sink()));
        Self {
            request: RequestClient::new(config.command_endpoint),
            dispatcher,
            events,
            sensor_cache: Mutex::new(None),
            controller_cache: Mutex::new(None),
        }
    }

    /// Opens a client handle with the default local endpoints.
    pub fn open_default() -> Self {
        Self::open(ClientConfig::default())
    }

    /// Registers a handler for one event kind; see
    /// [`CallbackDispatcher::register`].
    pub fn register_event(
        &self,
        kind: EventKind,
        handler: impl Fn(&EventRecord) + Send + Sync + 'static,
    ) -> CallbackId {
        self.dispatcher.register(kind, handler)
    }

    /// Removes an event registration; see
    /// [`CallbackDispatcher::unregister`].
    pub fn unregister_event(&self, id: CallbackId) -> bool {
        self.dispatcher.unregister(id)
    }

    /// Sends a request and returns the raw encoded reply.
    pub async fn send(&self, request: &Message) -> Vec<u8> {
        self.request.send(request).await
    }

    /// Sends a request and decodes the reply's leading integer status.
    pub async fn request_int(&self, request: &Message) -> i32 {
        self.request.request_int(request).await
    }

    /// Sends a request and decodes the reply's leading text payload.
    pub async fn request_text(&self, request: &Message) -> String {
        self.request.request_text(request).await
    }

    /// Sends a request and reports whether it succeeded.
    pub async fn request_bool(&self, request: &Message) -> bool {
        self.request.request_bool(request).await
    }

    /// Steps through the service's sensor list.
    ///
    /// The first call fetches the whole list in one request and caches it;
    /// subsequent calls walk the cache. Returns `None` at the end of the
    /// list, which also resets the iteration so the next call fetches a
    /// fresh list. The cache belongs to this handle and is not meant to be
    /// iterated from several tasks at once.
    pub async fn next_sensor(&self) -> Option<SensorInfo> {
        if self.sensor_cache.lock().is_none() {
            let mut request = Message::new();
            request.add_text("sensorList");
            let reply = self.request.send(&request).await;
            let mut reader = MessageReader::new(reply);
            let count = reader.take_int();
            let cached = if count > 0 {
                reader
            } else {
                MessageReader::new(Vec::new())
            };
            *self.sensor_cache.lock() = Some(cached);
        }

        let mut cache = self.sensor_cache.lock();
        let reader = cache.as_mut()?;
        if reader.is_empty() {
            *cache = None;
            return None;
        }
        Some(SensorInfo {
            protocol: reader.take_text(),
            model: reader.take_text(),
            id: reader.take_int(),
            data_types: reader.take_int(),
        })
    }

    /// Steps through the service's controller list.
    ///
    /// Same caching contract as [`next_sensor`](Client::next_sensor).
    pub async fn next_controller(&self) -> Option<ControllerInfo> {
        if self.controller_cache.lock().is_none() {
            let mut request = Message::new();
            request.add_text("controllerList");
            let reply = self.request.send(&request).await;
            let mut reader = MessageReader::new(reply);
            let count = reader.take_int();
            let cached = if count > 0 {
                reader
            } else {
                MessageReader::new(Vec::new())
            };
            *self.controller_cache.lock() = Some(cached);
        }

        let mut cache = self.controller_cache.lock();
        let reader = cache.as_mut()?;
        if reader.is_empty() {
            *cache = None;
            return None;
        }
        Some(ControllerInfo {
            id: reader.take_int(),
            controller_type: reader.take_int(),
            name: reader.take_text(),
            available: reader.take_int() != 0,
        })
    }

    /// Stops the event stream and the dispatcher, joining both.
    pub async fn shutdown(self) {
        if let Some(events) = self.events {
            events.shutdown().await;
        }
        self.dispatcher.shutdown().await;
    }
}
