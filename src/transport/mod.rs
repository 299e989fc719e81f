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

//! Byte-stream transport between client and service processes.
//!
//! - [`Connection`]: one bidirectional stream (Unix-domain or TCP) with
//!   connect, bounded read, write, and liveness query.
//! - [`ConnectionAcceptor`]: service-side listener that hands off each
//!   accepted peer connection exactly once.
//! - [`TransportError`]: the transport layer of the error hierarchy.

mod acceptor;
mod connection;
mod error;

pub use acceptor::ConnectionAcceptor;
pub use connection::Connection;
pub use error::TransportError;
