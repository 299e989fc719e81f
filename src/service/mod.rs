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

//! Service-side building blocks.
//!
//! A service process runs two listeners: a [`CommandServer`] on the command
//! endpoint, serving one request per connection, and an [`EventHub`] on the
//! event endpoint, holding long-lived subscriber connections and fanning
//! internal state changes out to all of them.

mod command;
mod hub;

pub use command::{CommandServer, RequestHandler};
pub use hub::{EventHub, EventPublisher, SubscriberSet};
