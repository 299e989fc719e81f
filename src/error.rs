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

//! Crate-level error type.

use crate::codec::CodecError;
use crate::endpoint::EndpointError;
use crate::transport::TransportError;
use thiserror::Error;

/// Any error this crate surfaces across a public boundary.
///
/// Most transport trouble is handled internally by retry or reconnect and
/// never reaches the caller; what does reach them is either a failure to
/// establish a listener, a malformed endpoint specification, or a strict
/// decode failure.
#[derive(Debug, Error)]
pub enum TellcoreError {
    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Wire decoding failure from a strict decode path.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Malformed endpoint specification.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),
}

impl TellcoreError {
    /// Whether retrying the same operation could reasonably succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(error) => error.is_recoverable(),
            Self::Codec(_) | Self::Endpoint(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_bind_failure_is_not_recoverable() {
        let error = TellcoreError::from(TransportError::BindFailed {
            endpoint: "/tmp/sock".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        });
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_endpoint_error_is_not_recoverable() {
        let error = TellcoreError::from(EndpointError::MissingHost {
            spec: "tcp://:80".to_string(),
        });
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("endpoint"));
    }
}
