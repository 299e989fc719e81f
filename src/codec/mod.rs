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

//! Self-describing wire codec for typed argument sequences.
//!
//! A [`Message`] is an ordered sequence of [`Argument`]s, each either text or
//! an integer. On the wire a message is the concatenation of its encoded
//! arguments, with no outer length field:
//!
//! ```text
//! text argument:    <byte length in decimal>:<utf-8 bytes>
//! integer argument: i<decimal value>s
//! ```
//!
//! Both peers must know, from the already-consumed type tag of a message,
//! exactly how many and which kind of arguments remain. Decoding walks the
//! buffer left to right through a consuming cursor, [`MessageReader`].
//!
//! # Permissive and strict decoding
//!
//! The default `take_*` methods never fail: malformed or truncated input
//! yields the empty string or zero, and the cursor is left where it was.
//! Callers are expected to treat a sentinel value immediately after a tag
//! read as a garbled message and discard the rest of the buffer. The
//! `take_*_strict` variants report the fault as a [`CodecError`] instead,
//! for callers (and test harnesses) that want the failure made explicit.
//!
//! # Examples
//!
//! ```rust
//! use tellcore::codec::{Message, MessageReader};
//!
//! let mut message = Message::new();
//! message.add_text("SensorEvent");
//! message.add_int(42);
//!
//! let mut reader = MessageReader::new(message.encode());
//! assert_eq!(reader.take_text(), "SensorEvent");
//! assert_eq!(reader.take_int(), 42);
//! assert!(reader.is_empty());
//! ```

mod error;

pub use error::CodecError;

/// A single typed value within a [`Message`].
///
/// Arguments are order-significant and carry no names; the positional schema
/// of a message is fixed by its leading type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// A text value (may be empty).
    Text(String),
    /// A signed integer value.
    Int(i32),
}

/// An ordered sequence of typed arguments, encodable to a wire buffer.
///
/// Encoding is purely additive: arguments are appended in order and written
/// out in order. There is no removal or in-place mutation; decoding happens
/// through [`MessageReader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    args: Vec<Argument>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text argument.
    pub fn add_text(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Argument::Text(value.into()));
        self
    }

    /// Appends an integer argument.
    pub fn add_int(&mut self, value: i32) -> &mut Self {
        self.args.push(Argument::Int(value));
        self
    }

    /// Returns the arguments appended so far, in order.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Encodes the message into a single wire buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        for arg in &self.args {
            match arg {
                Argument::Text(text) => {
                    buffer.extend_from_slice(text.len().to_string().as_bytes());
                    buffer.push(b':');
                    buffer.extend_from_slice(text.as_bytes());
                }
                Argument::Int(value) => {
                    buffer.push(b'i');
                    buffer.extend_from_slice(value.to_string().as_bytes());
                    buffer.push(b's');
                }
            }
        }
        buffer
    }
}

/// Consuming cursor over an encoded message buffer.
///
/// Each successful `take` removes the consumed prefix, so repeated calls
/// walk the buffer left to right. A failed `take` leaves the cursor
/// untouched.
#[derive(Debug, Clone)]
pub struct MessageReader {
    buffer: Vec<u8>,
    pos: usize,
}

impl MessageReader {
    /// Creates a reader over an encoded buffer.
    pub fn new(buffer: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: buffer.into(),
            pos: 0,
        }
    }

    /// Returns `true` when the buffer is fully consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    /// Number of unconsumed bytes remaining.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.pos)
    }

    /// Takes the next text argument, or `""` if the buffer is exhausted or
    /// the next argument is not well-formed text.
    pub fn take_text(&mut self) -> String {
        self.take_text_strict().unwrap_or_default()
    }

    /// Takes the next integer argument, or `0` if the buffer is exhausted or
    /// the next argument is not a well-formed integer.
    pub fn take_int(&mut self) -> i32 {
        self.take_int_strict().unwrap_or(0)
    }

    /// Takes the next text argument, reporting malformed input explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] when the next bytes are not a
    /// decimal length followed by `:`, or [`CodecError::UnexpectedEnd`] when
    /// the declared length runs past the end of the buffer. The cursor is
    /// not advanced on error.
    pub fn take_text_strict(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        let mut pos = self.pos;
        let mut len: usize = 0;
        let mut digits = 0usize;
        while pos < self.buffer.len() && self.buffer[pos].is_ascii_digit() {
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add((self.buffer[pos] - b'0') as usize))
                .ok_or(CodecError::Malformed {
                    expected: "text",
                    offset: start,
                })?;
            digits += 1;
            pos += 1;
        }
        if digits == 0 || pos >= self.buffer.len() || self.buffer[pos] != b':' {
            return Err(CodecError::Malformed {
                expected: "text",
                offset: start,
            });
        }
        pos += 1;
        let end = pos.checked_add(len).ok_or(CodecError::Malformed {
            expected: "text",
            offset: start,
        })?;
        if end > self.buffer.len() {
            return Err(CodecError::UnexpectedEnd { offset: start });
        }
        let text = String::from_utf8_lossy(&self.buffer[pos..end]).into_owned();
        self.pos = end;
        Ok(text)
    }

    /// Takes the next integer argument, reporting malformed input explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] when the next bytes are not
    /// `i<decimal>s`, or [`CodecError::UnexpectedEnd`] when the buffer ends
    /// before the closing `s`. The cursor is not advanced on error.
    pub fn take_int_strict(&mut self) -> Result<i32, CodecError> {
        let start = self.pos;
        let mut pos = self.pos;
        if pos >= self.buffer.len() {
            return Err(CodecError::UnexpectedEnd { offset: start });
        }
        if self.buffer[pos] != b'i' {
            return Err(CodecError::Malformed {
                expected: "integer",
                offset: start,
            });
        }
        pos += 1;
        let digits_start = pos;
        if pos < self.buffer.len() && self.buffer[pos] == b'-' {
            pos += 1;
        }
        while pos < self.buffer.len() && self.buffer[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start
            || (pos == digits_start + 1 && self.buffer[digits_start] == b'-')
        {
            return Err(CodecError::Malformed {
                expected: "integer",
                offset: start,
            });
        }
        if pos >= self.buffer.len() {
            return Err(CodecError::UnexpectedEnd { offset: start });
        }
        if self.buffer[pos] != b's' {
            return Err(CodecError::Malformed {
                expected: "integer",
                offset: start,
            });
        }
        let text = std::str::from_utf8(&self.buffer[digits_start..pos]).map_err(|_| {
            CodecError::Malformed {
                expected: "integer",
                offset: start,
            }
        })?;
        let value: i32 = text.parse().map_err(|_| CodecError::Malformed {
            expected: "integer",
            offset: start,
        })?;
        self.pos = pos + 1;
        Ok(value)
    }
}
