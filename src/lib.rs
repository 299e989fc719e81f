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

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! ## Architecture
//!
//! The crate is organized around two local endpoints — a command endpoint
//! for request/response and an event endpoint for a broadcast stream — with
//! a symmetric client and service side:
//!
//! - **[`codec`]**: the length-prefixed text wire format shared by every
//!   connection
//! - **[`endpoint`]**: unix-socket and `tcp://host:port` endpoint
//!   specifications
//! - **[`transport`]**: a stream-agnostic [`Connection`](transport::Connection)
//!   and the [`ConnectionAcceptor`](transport::ConnectionAcceptor) behind
//!   both listeners
//! - **[`client`]**: the bounded-retry [`RequestClient`](client::RequestClient),
//!   the always-reconnecting [`EventClient`](client::EventClient), the
//!   serialized [`CallbackDispatcher`](client::CallbackDispatcher), and the
//!   [`Client`](client::Client) handle tying them together
//! - **[`service`]**: the [`CommandServer`](service::CommandServer) and the
//!   fan-out [`EventHub`](service::EventHub)
//! - **[`events`]**: the typed event records carried over the event stream
//! - **[`status`]**: integer status codes carried in command replies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tellcore::client::{Client, ClientConfig};
//! use tellcore::codec::Message;
//! use tellcore::events::EventKind;
//!
//! # async fn example() {
//! let client = Client::open(ClientConfig::default());
//!
//! client.register_event(EventKind::Sensor, |record| {
//!     println!("sensor update: {record:?}");
//! });
//!
//! let mut request = Message::new();
//! request.add_text("tdTurnOn");
//! request.add_int(1);
//! if client.request_bool(&request).await {
//!     println!("device 1 on");
//! }
//!
//! client.shutdown().await;
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod endpoint;
mod error;
pub mod events;
pub mod service;
pub mod status;
pub mod transport;

pub use error::TellcoreError;
