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

//! Status codes carried in service replies.
//!
//! A reply whose first argument is one of the negative codes below signals
//! an application-level failure. These are returned to the caller as-is and
//! never retried; only transport failures trigger retries.

/// The operation completed successfully.
pub const SUCCESS: i32 = 0;

/// The requested item was not found.
pub const ERROR_NOT_FOUND: i32 = -1;

/// The caller lacks permission for the operation.
pub const ERROR_PERMISSION_DENIED: i32 = -2;

/// No (more) devices match the request; also ends device iteration.
pub const ERROR_DEVICE_NOT_FOUND: i32 = -3;

/// The device does not support the requested method.
pub const ERROR_METHOD_NOT_SUPPORTED: i32 = -4;

/// Communication with the hardware failed.
pub const ERROR_COMMUNICATION: i32 = -5;

/// The service could not be reached. Synthesized locally by the request
/// client when every connection attempt within its retry bound failed.
pub const ERROR_CONNECTING_SERVICE: i32 = -6;

/// The service returned a reply the client could not interpret.
pub const ERROR_UNKNOWN_RESPONSE: i32 = -7;

/// The request was syntactically invalid.
pub const ERROR_SYNTAX: i32 = -8;

/// The connection to the service was lost mid-exchange.
pub const ERROR_BROKEN_PIPE: i32 = -9;

/// The exchange with the service completed but produced no usable reply.
pub const ERROR_COMMUNICATING_SERVICE: i32 = -10;

/// An unclassified error.
pub const ERROR_UNKNOWN: i32 = -99;
