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

//! Integration tests for the event stream's unbounded reconnect.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tellcore::client::{CallbackDispatcher, EventClient};
use tellcore::endpoint::Endpoint;
use tellcore::events::{EventKind, EventRecord};
use tellcore::service::EventHub;

const RECONNECT_DELAY: Duration = Duration::from_millis(30);
const READ_WAIT: Duration = Duration::from_millis(50);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn device_record(device_id: i32) -> EventRecord {
    EventRecord::Device {
        device_id,
        state: 1,
        state_value: String::new(),
    }
}

async fn wait_for<F: Fn() -> bool>(what: &str, condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn test_stream_survives_hub_restart() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("events"));

    let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = CallbackDispatcher::start();
    let sink = Arc::clone(&seen);
    dispatcher.register(EventKind::Device, move |record| {
        if let EventRecord::Device { device_id, .. } = record {
            sink.lock().push(*device_id);
        }
    });

    let hub = EventHub::start(endpoint.clone()).await.unwrap();
    let client = EventClient::start_with_timing(
        endpoint.clone(),
        dispatcher.sink(),
        RECONNECT_DELAY,
        READ_WAIT,
    );

    wait_for("first subscription", || hub.subscriber_count() > 0).await;
    assert!(hub.publisher().publish(device_record(1)));
    wait_for("first event", || seen.lock().contains(&1)).await;

    // Take the hub down; the client is now reconnecting in the background.
    hub.shutdown().await;
    tokio::time::sleep(RECONNECT_DELAY * 2).await;

    let hub = EventHub::start(endpoint).await.unwrap();
    wait_for("resubscription", || hub.subscriber_count() > 0).await;
    assert!(hub.publisher().publish(device_record(2)));
    wait_for("second event", || seen.lock().contains(&2)).await;

    assert_eq!(*seen.lock(), vec![1, 2], "no duplicates across reconnect");

    client.shutdown().await;
    hub.shutdown().await;
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_client_started_before_hub_connects_once_hub_appears() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("events"));

    let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = CallbackDispatcher::start();
    let sink = Arc::clone(&seen);
    dispatcher.register(EventKind::Device, move |record| {
        if let EventRecord::Device { device_id, .. } = record {
            sink.lock().push(*device_id);
        }
    });

    // No hub yet; the client retries silently.
    let client = EventClient::start_with_timing(
        endpoint.clone(),
        dispatcher.sink(),
        RECONNECT_DELAY,
        READ_WAIT,
    );
    tokio::time::sleep(RECONNECT_DELAY * 3).await;

    let hub = EventHub::start(endpoint).await.unwrap();
    wait_for("subscription", || hub.subscriber_count() > 0).await;
    assert!(hub.publisher().publish(device_record(7)));
    wait_for("event", || seen.lock().contains(&7)).await;

    client.shutdown().await;
    hub.shutdown().await;
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_interrupts_pending_read_promptly() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("events"));
    let hub = EventHub::start(endpoint.clone()).await.unwrap();

    let dispatcher = CallbackDispatcher::start();
    let client = EventClient::start_with_timing(
        endpoint,
        dispatcher.sink(),
        RECONNECT_DELAY,
        // A long read wait: shutdown must not have to sit it out.
        Duration::from_secs(30),
    );
    wait_for("subscription", || hub.subscriber_count() > 0).await;

    tokio::time::timeout(Duration::from_secs(2), client.shutdown())
        .await
        .expect("shutdown did not interrupt the pending read");

    hub.shutdown().await;
    dispatcher.shutdown().await;
}
