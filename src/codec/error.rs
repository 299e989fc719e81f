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

//! Wire codec error types.
//!
//! These errors are only produced by the strict decode paths; the default
//! permissive mode maps every fault to an empty/zero sentinel instead.

use thiserror::Error;

/// Errors reported by strict-mode decoding.
///
/// A codec error never aborts a connection by itself: callers that hit one
/// discard the remainder of the current read and keep their loop running.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer ended before the argument was complete.
    #[error("unexpected end of message at byte {offset}")]
    UnexpectedEnd {
        /// Byte offset where the truncated argument starts.
        offset: usize,
    },

    /// The bytes at the cursor are not a well-formed argument of the
    /// requested kind.
    #[error("malformed {expected} argument at byte {offset}")]
    Malformed {
        /// The argument kind the caller asked for.
        expected: &'static str,
        /// Byte offset of the malformed argument.
        offset: usize,
    },

    /// A message carried a type tag no schema is known for.
    #[error("unknown message tag `{tag}`")]
    UnknownTag {
        /// The unrecognized tag text.
        tag: String,
    },
}
