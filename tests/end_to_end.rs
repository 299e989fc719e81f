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

//! Full client-against-service integration: command round trips through a
//! handler, sensor list iteration, and event delivery from hub to handler.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tellcore::client::{Client, ClientConfig, SensorInfo};
use tellcore::codec::{Message, MessageReader};
use tellcore::endpoint::Endpoint;
use tellcore::events::{EventKind, EventRecord};
use tellcore::service::{CommandServer, EventHub, RequestHandler};
use tellcore::status;

struct FakeService;

#[async_trait]
impl RequestHandler for FakeService {
    async fn handle(&self, mut request: MessageReader) -> Message {
        let mut reply = Message::new();
        match request.take_text().as_str() {
            "tdGetNumDevices" => {
                reply.add_int(3);
            }
            "tdTurnOn" => {
                let device_id = request.take_int();
                reply.add_int(if device_id == 1 {
                    status::SUCCESS
                } else {
                    status::ERROR_DEVICE_NOT_FOUND
                });
            }
            "sensorList" => {
                reply.add_int(2);
                reply.add_text("fineoffset");
                reply.add_text("temperature");
                reply.add_int(135);
                reply.add_int(1);
                reply.add_text("mandolyn");
                reply.add_text("temperaturehumidity");
                reply.add_int(41);
                reply.add_int(3);
            }
            _ => {
                reply.add_int(status::ERROR_UNKNOWN);
            }
        }
        reply
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn wait_for<F: Fn() -> bool>(what: &str, condition: F) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn test_commands_and_events_through_a_full_stack() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let command_endpoint = Endpoint::local(dir.path().join("command"));
    let event_endpoint = Endpoint::local(dir.path().join("events"));

    let server = CommandServer::start(command_endpoint.clone(), Arc::new(FakeService))
        .await
        .unwrap();
    let hub = EventHub::start(event_endpoint.clone()).await.unwrap();

    let client = Client::open(ClientConfig {
        command_endpoint,
        event_endpoint: Some(event_endpoint),
    });

    let received: Arc<Mutex<Option<EventRecord>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&received);
    client.register_event(EventKind::Sensor, move |record| {
        *sink.lock() = Some(record.clone());
    });

    // Command path.
    let mut request = Message::new();
    request.add_text("tdGetNumDevices");
    assert_eq!(client.request_int(&request).await, 3);

    let mut request = Message::new();
    request.add_text("tdTurnOn");
    request.add_int(1);
    assert!(client.request_bool(&request).await);

    let mut request = Message::new();
    request.add_text("tdTurnOn");
    request.add_int(42);
    assert!(!client.request_bool(&request).await);

    // Event path.
    wait_for("event subscription", || hub.subscriber_count() > 0).await;
    let published = EventRecord::Sensor {
        protocol: "fineoffset".to_string(),
        model: "temperature".to_string(),
        id: 135,
        data_type: 1,
        value: "21.5".to_string(),
        timestamp: 1_756_000_000,
    };
    assert!(hub.publisher().publish(published.clone()));
    wait_for("event delivery", || received.lock().is_some()).await;
    assert_eq!(received.lock().take().unwrap(), published);

    client.shutdown().await;
    hub.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_sensor_list_iteration_walks_cache_then_resets() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let command_endpoint = Endpoint::local(dir.path().join("command"));
    let server = CommandServer::start(command_endpoint.clone(), Arc::new(FakeService))
        .await
        .unwrap();

    let client = Client::open(ClientConfig {
        command_endpoint,
        event_endpoint: None,
    });

    let first = client.next_sensor().await.unwrap();
    assert_eq!(
        first,
        SensorInfo {
            protocol: "fineoffset".to_string(),
            model: "temperature".to_string(),
            id: 135,
            data_types: 1,
        }
    );
    let second = client.next_sensor().await.unwrap();
    assert_eq!(second.protocol, "mandolyn");
    assert_eq!(second.id, 41);

    // End of list resets the iteration; the next call refetches.
    assert!(client.next_sensor().await.is_none());
    assert_eq!(client.next_sensor().await.unwrap(), first);

    client.shutdown().await;
    server.shutdown().await;
}
