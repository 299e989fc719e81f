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

//! One-shot request/response transport with bounded retry.
//!
//! Every call opens a fresh short-lived [`Connection`], writes the encoded
//! request, reads the encoded reply, and closes. Transport failures at any
//! stage (connect, write, liveness lost, empty read) are retried after a
//! fixed backoff, up to a bound; once a reply has actually been read it is
//! returned as-is, even when its content signals an application-level error.
//!
//! The retry bound is "try `attempts - 1` times, then fail fast": the final
//! attempt within the bound never touches the network and instead
//! synthesizes a reply carrying [`status::ERROR_CONNECTING_SERVICE`], so
//! callers always get a decodable reply even under total service
//! unavailability.

use crate::codec::{Message, MessageReader};
use crate::endpoint::Endpoint;
use crate::status;
use crate::transport::Connection;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Total attempt bound, counting the synthesized final attempt.
pub const DEFAULT_ATTEMPTS: u32 = 20;

/// Backoff between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// How long to wait for the service's reply on one attempt.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(8);

/// Performs request/response round trips against the service's command
/// endpoint.
pub struct RequestClient {
    endpoint: Endpoint,
    attempts: u32,
    backoff: Duration,
    reply_timeout: Duration,
}

impl RequestClient {
    /// Creates a client for the given command endpoint with default timing.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Overrides the attempt bound (including the synthesized final
    /// attempt). Mainly for tests.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(2);
        self
    }

    /// Overrides the backoff between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Overrides the per-attempt reply timeout.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Sends one request and returns the raw encoded reply.
    ///
    /// Always returns a decodable buffer: on exhausting the retry bound the
    /// reply encodes the single status [`status::ERROR_CONNECTING_SERVICE`].
    pub async fn send(&self, request: &Message) -> Vec<u8> {
        let payload = request.encode();
        let mut tries = 0u32;
        loop {
            tries += 1;
            if tries == self.attempts {
                // Fail fast: this attempt never touches the network.
                warn!(endpoint = %self.endpoint, tries, "giving up reaching service");
                let mut reply = Message::new();
                reply.add_int(status::ERROR_CONNECTING_SERVICE);
                return reply.encode();
            }

            let mut connection = Connection::new();
            connection.connect(&self.endpoint).await;
            if !connection.is_connected() {
                debug!(endpoint = %self.endpoint, tries, "connect failed, backing off");
                sleep(self.backoff).await;
                continue;
            }
            if connection.write(&payload).await.is_err() || !connection.is_connected() {
                debug!(endpoint = %self.endpoint, tries, "write failed, backing off");
                sleep(self.backoff).await;
                continue;
            }
            let reply = connection.read(self.reply_timeout).await;
            if reply.is_empty() || !connection.is_connected() {
                debug!(endpoint = %self.endpoint, tries, "no reply, backing off");
                sleep(self.backoff).await;
                continue;
            }
            connection.close().await;
            return reply;
        }
    }

    /// Sends a request and decodes the reply's leading integer status.
    ///
    /// An empty reply decodes to [`status::ERROR_COMMUNICATING_SERVICE`].
    pub async fn request_int(&self, request: &Message) -> i32 {
        let reply = self.send(request).await;
        if reply.is_empty() {
            return status::ERROR_COMMUNICATING_SERVICE;
        }
        MessageReader::new(reply).take_int()
    }

    /// Sends a request and decodes the reply's leading text payload.
    pub async fn request_text(&self, request: &Message) -> String {
        MessageReader::new(self.send(request).await).take_text()
    }

    /// Sends a request and reports whether the reply status is
    /// [`status::SUCCESS`].
    pub async fn request_bool(&self, request: &Message) -> bool {
        self.request_int(request).await == status::SUCCESS
    }
}
