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

//! Integration tests for the bounded request retry loop.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tellcore::client::RequestClient;
use tellcore::codec::{Message, MessageReader};
use tellcore::endpoint::Endpoint;
use tellcore::status;
use tellcore::transport::ConnectionAcceptor;

const BACKOFF: Duration = Duration::from_millis(20);
const REPLY_TIMEOUT: Duration = Duration::from_millis(200);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accepts connections and immediately closes each one, counting accepts.
async fn accept_and_close(endpoint: Endpoint, counter: Arc<AtomicU32>) -> ConnectionAcceptorGuard {
    let mut acceptor = ConnectionAcceptor::bind(endpoint).await.unwrap();
    let task = tokio::spawn(async move {
        while let Some(mut connection) = acceptor.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            connection.close().await;
        }
    });
    ConnectionAcceptorGuard { task }
}

struct ConnectionAcceptorGuard {
    task: tokio::task::JoinHandle<()>,
}

impl ConnectionAcceptorGuard {
    fn stop(self) {
        self.task.abort();
    }
}

#[tokio::test]
async fn test_no_listener_synthesizes_connection_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("nobody-home"));
    let client = RequestClient::new(endpoint)
        .with_attempts(4)
        .with_backoff(BACKOFF)
        .with_reply_timeout(REPLY_TIMEOUT);

    let mut request = Message::new();
    request.add_text("tdGetNumDevices");

    let started = Instant::now();
    let reply = client.send(&request).await;
    let elapsed = started.elapsed();

    let mut reader = MessageReader::new(reply);
    assert_eq!(reader.take_int(), status::ERROR_CONNECTING_SERVICE);
    assert!(reader.is_empty(), "canned reply carries a single status");

    // Three real attempts each back off; the synthesized fourth does not.
    assert!(elapsed >= BACKOFF * 3, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_dropped_connections_are_retried_exactly_attempts_minus_one_times() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("drops"));
    let counter = Arc::new(AtomicU32::new(0));
    let guard = accept_and_close(endpoint.clone(), Arc::clone(&counter)).await;

    let client = RequestClient::new(endpoint)
        .with_backoff(BACKOFF)
        .with_reply_timeout(REPLY_TIMEOUT);

    let mut request = Message::new();
    request.add_text("tdGetNumDevices");
    let mut reader = MessageReader::new(client.send(&request).await);
    assert_eq!(reader.take_int(), status::ERROR_CONNECTING_SERVICE);

    // Let the counting task drain any connection still in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Nineteen network attempts; the twentieth never touches a socket.
    assert_eq!(counter.load(Ordering::SeqCst), 19);
    guard.stop();
}

#[tokio::test]
async fn test_reply_after_transient_failures_is_returned_unmodified() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("flaky"));
    let mut acceptor = ConnectionAcceptor::bind(endpoint.clone()).await.unwrap();
    let server = tokio::spawn(async move {
        let mut served = 0u32;
        while let Some(mut connection) = acceptor.accept().await {
            served += 1;
            if served < 3 {
                connection.close().await;
                continue;
            }
            let request = connection.read(Duration::from_secs(1)).await;
            assert!(!request.is_empty());
            let mut reply = Message::new();
            reply.add_int(status::SUCCESS);
            reply.add_text("ok");
            connection.write(&reply.encode()).await.unwrap();
            connection.close().await;
            break;
        }
    });

    let client = RequestClient::new(endpoint)
        .with_attempts(20)
        .with_backoff(BACKOFF)
        .with_reply_timeout(REPLY_TIMEOUT);
    let mut request = Message::new();
    request.add_text("tdGetNumDevices");

    let mut reader = MessageReader::new(client.send(&request).await);
    assert_eq!(reader.take_int(), status::SUCCESS);
    assert_eq!(reader.take_text(), "ok");
    server.await.unwrap();
}

#[tokio::test]
async fn test_application_level_error_is_not_retried() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Endpoint::local(dir.path().join("app-error"));
    let counter = Arc::new(AtomicU32::new(0));
    let mut acceptor = ConnectionAcceptor::bind(endpoint.clone()).await.unwrap();
    let served = Arc::clone(&counter);
    let server = tokio::spawn(async move {
        while let Some(mut connection) = acceptor.accept().await {
            served.fetch_add(1, Ordering::SeqCst);
            let _ = connection.read(Duration::from_secs(1)).await;
            let mut reply = Message::new();
            reply.add_int(status::ERROR_DEVICE_NOT_FOUND);
            connection.write(&reply.encode()).await.unwrap();
            connection.close().await;
        }
    });

    let client = RequestClient::new(endpoint)
        .with_attempts(5)
        .with_backoff(BACKOFF)
        .with_reply_timeout(REPLY_TIMEOUT);
    let mut request = Message::new();
    request.add_text("tdTurnOn");
    request.add_int(9999);

    // An error the service chose to send is a delivered reply, not a
    // transport failure.
    assert_eq!(
        client.request_int(&request).await,
        status::ERROR_DEVICE_NOT_FOUND
    );
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    server.abort();
}
