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

//! The broker transport seam.
//!
//! The agent does not manage broker connections itself. It drives an
//! implementation of [`BrokerTransport`], which owns connection handling,
//! subscription mechanics, wire framing, delivery guarantees and any reconnect
//! policy. [`InMemoryBroker`] provides an in-process implementation.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::common::{InboundSender, TransportError};
use crate::message::PublishOptions;

pub use memory::{InMemoryBroker, InMemoryTransport, PublishedMessage};

mod memory;

/// Connection state as reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No live connection.
    #[default]
    Disconnected,
    /// Connected and able to publish and subscribe.
    Connected,
}

impl ConnectionState {
    /// Returns `true` for [`ConnectionState::Connected`].
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Publish/subscribe primitive consumed by the agent.
#[async_trait]
pub trait BrokerTransport: Debug + Send + Sync + 'static {
    /// Opens the connection and binds `inbound` as its single delivery channel.
    ///
    /// The returned result is the one connection-state notification for this
    /// attempt. Implementations deliver each received message at most once to
    /// `inbound`, carrying its topic, payload and user properties.
    ///
    /// # Errors
    ///
    /// Any failure to establish the connection. The agent does not retry.
    async fn connect(&self, inbound: InboundSender) -> Result<(), TransportError>;

    /// Publishes `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Any rejection by the transport or broker.
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        options: PublishOptions,
    ) -> Result<(), TransportError>;

    /// Adds a subscription. Patterns support `*` for one level and a trailing `>`.
    ///
    /// # Errors
    ///
    /// Any rejection by the transport or broker.
    async fn subscribe(&self, topic_pattern: &str) -> Result<(), TransportError>;

    /// Closes the connection. Behaviour when already disconnected is transport-defined.
    ///
    /// # Errors
    ///
    /// Any failure while tearing the connection down.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;
}
