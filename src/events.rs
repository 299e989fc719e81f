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

//! Typed state-change notifications exchanged over the event stream.
//!
//! Every event-stream message starts with a text type tag that fixes the
//! positional schema of the remaining arguments. [`EventRecord`] is the
//! decoded sum type with one variant per known tag:
//!
//! | tag                 | fields                                                            |
//! |---------------------|-------------------------------------------------------------------|
//! | `DeviceChangeEvent` | deviceId(int), changeEvent(int), changeType(int)                  |
//! | `DeviceEvent`       | deviceId(int), state(int), stateValue(text)                       |
//! | `RawDeviceEvent`    | data(text), controllerId(int)                                     |
//! | `SensorEvent`       | protocol(text), model(text), id(int), dataType(int), value(text), timestamp(int) |
//! | `ControllerEvent`   | controllerId(int), changeEvent(int), changeType(int), newValue(text) |
//!
//! Records are owned, immutable values: they cross the dispatch queue by
//! value, and the dispatcher releases each one after all matching handlers
//! have run.

use crate::codec::{CodecError, Message, MessageReader};

/// The kind of a state-change notification, used to key callback
/// registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A device's configuration changed (added, removed, renamed, ...).
    DeviceChange,
    /// A device's state changed (turned on, dimmed, ...).
    Device,
    /// Raw protocol data was received from a controller.
    RawDevice,
    /// A sensor reported a reading.
    Sensor,
    /// A controller was attached, detached, or changed.
    Controller,
}

impl EventKind {
    /// The wire type tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DeviceChange => "DeviceChangeEvent",
            Self::Device => "DeviceEvent",
            Self::RawDevice => "RawDeviceEvent",
            Self::Sensor => "SensorEvent",
            Self::Controller => "ControllerEvent",
        }
    }

    /// Resolves a wire type tag, or `None` for an unknown tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DeviceChangeEvent" => Some(Self::DeviceChange),
            "DeviceEvent" => Some(Self::Device),
            "RawDeviceEvent" => Some(Self::RawDevice),
            "SensorEvent" => Some(Self::Sensor),
            "ControllerEvent" => Some(Self::Controller),
            _ => None,
        }
    }
}

/// A decoded, typed state-change notification.
///
/// Consumers match exhaustively on the variant; each variant's fields are
/// exactly the positional fields of its wire schema.
#[derive(Debug, Clone, PartialEq)]
pub enum EventRecord {
    /// A device's configuration changed.
    DeviceChange {
        /// The affected device.
        device_id: i32,
        /// What changed (added/changed/removed).
        change_event: i32,
        /// Which aspect changed (name/protocol/model/...).
        change_type: i32,
    },
    /// A device's state changed.
    Device {
        /// The affected device.
        device_id: i32,
        /// The new state.
        state: i32,
        /// State payload, e.g. a dim level.
        state_value: String,
    },
    /// Raw protocol data was received.
    RawDevice {
        /// The raw protocol payload.
        data: String,
        /// The controller that received it.
        controller_id: i32,
    },
    /// A sensor reported a reading.
    Sensor {
        /// Sensor protocol name.
        protocol: String,
        /// Sensor model name.
        model: String,
        /// Sensor id within its protocol.
        id: i32,
        /// Which quantity was measured.
        data_type: i32,
        /// The measured value, as text.
        value: String,
        /// Unix timestamp of the reading.
        timestamp: i32,
    },
    /// A controller was attached, detached, or changed.
    Controller {
        /// The affected controller.
        controller_id: i32,
        /// What happened (added/removed/state change).
        change_event: i32,
        /// Which aspect changed.
        change_type: i32,
        /// New value for the changed aspect, as text.
        new_value: String,
    },
}

impl EventRecord {
    /// The kind of this record.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DeviceChange { .. } => EventKind::DeviceChange,
            Self::Device { .. } => EventKind::Device,
            Self::RawDevice { .. } => EventKind::RawDevice,
            Self::Sensor { .. } => EventKind::Sensor,
            Self::Controller { .. } => EventKind::Controller,
        }
    }

    /// Encodes this record as a tagged message, tag first.
    pub fn encode(&self) -> Message {
        let mut message = Message::new();
        message.add_text(self.kind().tag());
        match self {
            Self::DeviceChange {
                device_id,
                change_event,
                change_type,
            } => {
                message
                    .add_int(*device_id)
                    .add_int(*change_event)
                    .add_int(*change_type);
            }
            Self::Device {
                device_id,
                state,
                state_value,
            } => {
                message
                    .add_int(*device_id)
                    .add_int(*state)
                    .add_text(state_value.clone());
            }
            Self::RawDevice {
                data,
                controller_id,
            } => {
                message.add_text(data.clone()).add_int(*controller_id);
            }
            Self::Sensor {
                protocol,
                model,
                id,
                data_type,
                value,
                timestamp,
            } => {
                message
                    .add_text(protocol.clone())
                    .add_text(model.clone())
                    .add_int(*id)
                    .add_int(*data_type)
                    .add_text(value.clone())
                    .add_int(*timestamp);
            }
            Self::Controller {
                controller_id,
                change_event,
                change_type,
                new_value,
            } => {
                message
                    .add_int(*controller_id)
                    .add_int(*change_event)
                    .add_int(*change_type)
                    .add_text(new_value.clone());
            }
        }
        message
    }

    /// Decodes one record from the reader, permissively.
    ///
    /// Consumes the type tag and then the positional fields of that tag.
    /// Returns `None` when the tag is empty or unrecognized; the caller is
    /// expected to discard the remainder of the current read in that case.
    pub fn decode(reader: &mut MessageReader) -> Option<Self> {
        let tag = reader.take_text();
        let kind = EventKind::from_tag(&tag)?;
        Some(Self::decode_fields(kind, reader))
    }

    /// Decodes one record, reporting an unknown tag explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownTag`] for an unrecognized tag, or the
    /// underlying codec error when the tag itself cannot be read.
    pub fn decode_strict(reader: &mut MessageReader) -> Result<Self, CodecError> {
        let tag = reader.take_text_strict()?;
        let kind = EventKind::from_tag(&tag).ok_or(CodecError::UnknownTag { tag })?;
        Ok(Self::decode_fields(kind, reader))
    }

    fn decode_fields(kind: EventKind, reader: &mut MessageReader) -> Self {
        match kind {
            EventKind::DeviceChange => Self::DeviceChange {
                device_id: reader.take_int(),
                change_event: reader.take_int(),
                change_type: reader.take_int(),
            },
            EventKind::Device => Self::Device {
                device_id: reader.take_int(),
                state: reader.take_int(),
                state_value: reader.take_text(),
            },
            EventKind::RawDevice => Self::RawDevice {
                data: reader.take_text(),
                controller_id: reader.take_int(),
            },
            EventKind::Sensor => Self::Sensor {
                protocol: reader.take_text(),
                model: reader.take_text(),
                id: reader.take_int(),
                data_type: reader.take_int(),
                value: reader.take_text(),
                timestamp: reader.take_int(),
            },
            EventKind::Controller => Self::Controller {
                controller_id: reader.take_int(),
                change_event: reader.take_int(),
                change_type: reader.take_int(),
                new_value: reader.take_text(),
            },
        }
    }
}
