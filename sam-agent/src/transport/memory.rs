/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! In-process broker used for tests, demos and single-process deployments.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::common::topics::topic_matches;
use crate::common::{InboundSender, TransportError, UserProperties};
use crate::message::{InboundMessage, PublishOptions};
use crate::transport::{BrokerTransport, ConnectionState};

type ClientId = usize;

/// A publish accepted by an [`InMemoryBroker`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    /// Name of the client that published.
    pub publisher: String,
    /// Destination topic.
    pub topic: String,
    /// Payload text.
    pub payload: String,
    /// User properties attached by the publisher.
    pub user_properties: Option<UserProperties>,
}

impl PublishedMessage {
    /// Parses the payload as JSON.
    ///
    /// # Errors
    ///
    /// Fails if the payload is not valid JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.payload)
    }
}

#[derive(Debug)]
struct ClientEntry {
    name: String,
    sink: InboundSender,
    subscriptions: Vec<String>,
}

#[derive(Debug, Default)]
struct BrokerInner {
    clients: DashMap<ClientId, ClientEntry>,
    /// Also serializes delivery so every subscriber observes publish order.
    history: Mutex<Vec<PublishedMessage>>,
    unavailable: AtomicBool,
    next_client_id: AtomicUsize,
}

/// An in-process publish/subscribe hub.
///
/// Clients obtained from [`InMemoryBroker::client`] implement [`BrokerTransport`].
/// A publish is delivered once to every connected client holding a matching
/// subscription, the publisher included, with user properties passed through.
/// Every accepted publish is kept in [`history`](Self::history).
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    inner: Arc<BrokerInner>,
}

impl InMemoryBroker {
    /// Creates an empty, available broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disconnected transport for a client called `name`.
    #[must_use]
    pub fn client(&self, name: impl Into<String>) -> InMemoryTransport {
        InMemoryTransport {
            broker: self.clone(),
            id: self.inner.next_client_id.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            connected: AtomicBool::new(false),
        }
    }

    /// Makes the broker reachable or unreachable.
    ///
    /// While unreachable, connection attempts and publishes fail. Existing
    /// connections and subscriptions are kept.
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Returns `true` while the broker accepts connections and publishes.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.inner.unavailable.load(Ordering::SeqCst)
    }

    /// Every publish accepted so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<PublishedMessage> {
        self.inner.history.lock().clone()
    }

    /// Accepted publishes whose topic matches `pattern`.
    #[must_use]
    pub fn published_matching(&self, pattern: &str) -> Vec<PublishedMessage> {
        self.inner
            .history
            .lock()
            .iter()
            .filter(|m| topic_matches(pattern, &m.topic))
            .cloned()
            .collect()
    }

    /// Number of accepted publishes.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.inner.history.lock().len()
    }

    /// Number of connected clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.inner.clients.len()
    }

    fn route(&self, message: PublishedMessage) {
        let mut history = self.inner.history.lock();
        let mut delivered = 0usize;
        for client in self.inner.clients.iter() {
            if !client
                .subscriptions
                .iter()
                .any(|pattern| topic_matches(pattern, &message.topic))
            {
                continue;
            }
            let inbound = InboundMessage {
                topic: message.topic.clone(),
                payload: message.payload.clone(),
                user_properties: message.user_properties.clone().unwrap_or_default(),
            };
            if client.sink.send(inbound).is_ok() {
                delivered += 1;
            } else {
                warn!(client = %client.name, "Inbound channel closed, message not delivered");
            }
        }
        trace!(topic = %message.topic, delivered, "Routed publish");
        history.push(message);
    }
}

/// One client connection to an [`InMemoryBroker`].
#[derive(Debug)]
pub struct InMemoryTransport {
    broker: InMemoryBroker,
    id: ClientId,
    name: String,
    connected: AtomicBool,
}

impl InMemoryTransport {
    /// The client name used in [`PublishedMessage::publisher`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl Drop for InMemoryTransport {
    fn drop(&mut self) {
        self.broker.inner.clients.remove(&self.id);
    }
}

#[async_trait]
impl BrokerTransport for InMemoryTransport {
    async fn connect(&self, inbound: InboundSender) -> Result<(), TransportError> {
        if !self.broker.is_available() {
            return Err(TransportError::Unavailable(
                "in-memory broker is not accepting connections".to_string(),
            ));
        }
        self.broker.inner.clients.insert(
            self.id,
            ClientEntry {
                name: self.name.clone(),
                sink: inbound,
                subscriptions: Vec::new(),
            },
        );
        self.connected.store(true, Ordering::SeqCst);
        debug!(client = %self.name, "Connected to in-memory broker");
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: String,
        options: PublishOptions,
    ) -> Result<(), TransportError> {
        self.ensure_connected()?;
        if !self.broker.is_available() {
            return Err(TransportError::Publish {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        self.broker.route(PublishedMessage {
            publisher: self.name.clone(),
            topic: topic.to_string(),
            payload,
            user_properties: options.user_properties,
        });
        Ok(())
    }

    async fn subscribe(&self, topic_pattern: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let mut entry = self
            .broker
            .inner
            .clients
            .get_mut(&self.id)
            .ok_or(TransportError::NotConnected)?;
        if !entry.subscriptions.iter().any(|p| p == topic_pattern) {
            entry.subscriptions.push(topic_pattern.to_string());
        }
        debug!(client = %self.name, pattern = topic_pattern, "Subscribed");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        if self.broker.inner.clients.remove(&self.id).is_some() {
            debug!(client = %self.name, "Disconnected from in-memory broker");
        }
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_delivers_to_matching_subscribers_only() {
        let broker = InMemoryBroker::new();
        let publisher = broker.client("publisher");
        let listener = broker.client("listener");
        let (pub_tx, _pub_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();

        publisher.connect(pub_tx).await.unwrap();
        listener.connect(tx).await.unwrap();
        listener.subscribe("a/*/c").await.unwrap();

        publisher
            .publish("a/b/c", "one".to_string(), PublishOptions::default())
            .await
            .unwrap();
        publisher
            .publish("a/b/d", "two".to_string(), PublishOptions::default())
            .await
            .unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.topic, "a/b/c");
        assert_eq!(received.payload, "one");
        assert!(rx.try_recv().is_err());
        assert_eq!(broker.publish_count(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_subscriptions_deliver_once() {
        let broker = InMemoryBroker::new();
        let client = broker.client("client");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.connect(tx).await.unwrap();
        client.subscribe("a/>").await.unwrap();
        client.subscribe("a/*").await.unwrap();

        client
            .publish("a/b", String::new(), PublishOptions::default())
            .await
            .unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_user_properties_pass_through() {
        let broker = InMemoryBroker::new();
        let client = broker.client("client");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.connect(tx).await.unwrap();
        client.subscribe("t").await.unwrap();

        let mut props = UserProperties::new();
        props.insert("session_id".to_string(), json!("s-9"));
        client
            .publish("t", "{}".to_string(), PublishOptions::with_user_properties(props.clone()))
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap().user_properties, props);
        assert_eq!(broker.history()[0].user_properties, Some(props));
    }

    #[tokio::test]
    async fn test_unavailable_broker_rejects_connect_and_publish() {
        let broker = InMemoryBroker::new();
        let client = broker.client("client");
        broker.set_available(false);

        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            client.connect(tx.clone()).await,
            Err(TransportError::Unavailable(_))
        ));
        assert_eq!(client.state(), ConnectionState::Disconnected);

        broker.set_available(true);
        client.connect(tx).await.unwrap();
        broker.set_available(false);
        assert!(matches!(
            client
                .publish("t", String::new(), PublishOptions::default())
                .await,
            Err(TransportError::Publish { .. })
        ));
        assert_eq!(broker.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let broker = InMemoryBroker::new();
        let client = broker.client("client");
        assert!(matches!(
            client.subscribe("t").await,
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            client
                .publish("t", String::new(), PublishOptions::default())
                .await,
            Err(TransportError::NotConnected)
        ));
        // Disconnecting twice is harmless.
        client.disconnect().await.unwrap();
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_client_is_unregistered() {
        let broker = InMemoryBroker::new();
        let client = broker.client("client");
        let (tx, _rx) = mpsc::unbounded_channel();
        client.connect(tx).await.unwrap();
        assert_eq!(broker.client_count(), 1);

        drop(client);
        assert_eq!(broker.client_count(), 0);
    }
}
