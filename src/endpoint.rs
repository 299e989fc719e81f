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

//! Listen/connect target descriptors.
//!
//! An [`Endpoint`] is either a filesystem-local socket path or a TCP
//! address. The string form is either a plain path or `tcp://<ip>:<port>`,
//! where the host must be a literal IP address. Endpoints are immutable once
//! constructed; the transport layer interprets them.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Address descriptor for a local or network rendezvous point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A filesystem-local socket path.
    Local(PathBuf),
    /// A TCP host:port pair.
    Tcp(SocketAddr),
}

impl Endpoint {
    /// Creates a local endpoint from a filesystem path.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(path.into())
    }

    /// Creates a TCP endpoint from a socket address.
    pub fn tcp(addr: SocketAddr) -> Self {
        Self::Tcp(addr)
    }
}

/// Errors produced when parsing an endpoint string.
///
/// These are configuration failures: the owning component logs the error and
/// never attempts transport (see the crate-level error taxonomy).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// A `tcp://` endpoint without a `:` between host and port.
    #[error("invalid endpoint `{spec}`: missing `:` between host and port")]
    MissingPortSeparator {
        /// The offending endpoint string.
        spec: String,
    },

    /// A `tcp://` endpoint with an empty host part.
    #[error("invalid endpoint `{spec}`: missing bind address")]
    MissingHost {
        /// The offending endpoint string.
        spec: String,
    },

    /// A `tcp://` endpoint whose port is not a non-zero number.
    #[error("invalid endpoint `{spec}`: cannot interpret port number")]
    InvalidPort {
        /// The offending endpoint string.
        spec: String,
    },

    /// A `tcp://` endpoint whose host is not a literal IP address.
    #[error("invalid endpoint `{spec}`: host must be a literal IP address")]
    InvalidHost {
        /// The offending endpoint string.
        spec: String,
    },
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let Some(rest) = spec.strip_prefix("tcp://") else {
            return Ok(Self::Local(PathBuf::from(spec)));
        };
        let Some(colon) = rest.rfind(':') else {
            return Err(EndpointError::MissingPortSeparator {
                spec: spec.to_string(),
            });
        };
        let (host, port) = rest.split_at(colon);
        let port = &port[1..];
        if host.is_empty() {
            return Err(EndpointError::MissingHost {
                spec: spec.to_string(),
            });
        }
        let port: u16 = port
            .parse()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| EndpointError::InvalidPort {
                spec: spec.to_string(),
            })?;
        let ip: IpAddr = host.parse().map_err(|_| EndpointError::InvalidHost {
            spec: spec.to_string(),
        })?;
        Ok(Self::Tcp(SocketAddr::new(ip, port)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_path() {
        let endpoint: Endpoint = "/tmp/TellcoreClient".parse().unwrap();
        assert_eq!(endpoint, Endpoint::local("/tmp/TellcoreClient"));
    }

    #[test]
    fn test_parse_tcp() {
        let endpoint: Endpoint = "tcp://127.0.0.1:5000".parse().unwrap();
        assert_eq!(endpoint, Endpoint::Tcp("127.0.0.1:5000".parse().unwrap()));
    }

    #[test]
    fn test_parse_tcp_missing_colon() {
        let err = "tcp://127.0.0.1".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, EndpointError::MissingPortSeparator { .. }));
    }

    #[test]
    fn test_parse_tcp_missing_host() {
        let err = "tcp://:5000".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, EndpointError::MissingHost { .. }));
    }

    #[test]
    fn test_parse_tcp_bad_port() {
        for spec in ["tcp://127.0.0.1:abc", "tcp://127.0.0.1:0", "tcp://127.0.0.1:"] {
            let err = spec.parse::<Endpoint>().unwrap_err();
            assert!(
                matches!(err, EndpointError::InvalidPort { .. }),
                "spec {spec} gave {err}"
            );
        }
    }

    #[test]
    fn test_parse_tcp_hostname_rejected() {
        let err = "tcp://localhost:5000".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, EndpointError::InvalidHost { .. }));
    }

    #[test]
    fn test_display_round_trip() {
        for spec in ["/tmp/TellcoreEvents", "tcp://127.0.0.1:5000"] {
            let endpoint: Endpoint = spec.parse().unwrap();
            assert_eq!(endpoint.to_string(), spec);
        }
    }
}
