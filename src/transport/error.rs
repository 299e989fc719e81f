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

//! Transport layer error types.
//!
//! Transport errors are the lowest layer of the crate's error hierarchy.
//! They are never surfaced to event subscribers: the request client retries
//! them (bounded), the event client reconnects on them (unbounded), and the
//! event hub evicts the failing subscriber.

use std::io;
use thiserror::Error;

/// Errors that can occur in the transport layer.
///
/// Connect failures are not represented here: a failed
/// [`Connection::connect`](crate::transport::Connection::connect) leaves the
/// connection not-connected instead of raising, and callers poll
/// `is_connected`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to write to an established connection.
    #[error("write failed: {source}")]
    WriteFailed {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The connection is not established.
    #[error("connection is not established")]
    NotConnected,

    /// Failed to bind a listening endpoint.
    ///
    /// Bind failures (address in use, permission denied) are not retried:
    /// the owning loop logs and exits.
    #[error("failed to bind {endpoint}: {source}")]
    BindFailed {
        /// The endpoint that failed to bind.
        endpoint: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An unexpected I/O error occurred.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Returns `true` if the operation may succeed when retried on a fresh
    /// connection.
    ///
    /// Bind failures are the one non-recoverable case: retrying them without
    /// operator intervention cannot help.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::BindFailed { .. })
    }
}

impl From<io::Error> for TransportError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}
