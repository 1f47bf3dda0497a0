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

//! Error types surfaced by the agent framework.

use std::path::PathBuf;

use thiserror::Error;

use crate::agent::AgentState;

/// Errors returned by [`Agent`](crate::agent::Agent) lifecycle operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// `run()` was called before any action was registered.
    #[error("No actions found. Register at least one action before running the agent")]
    NoActions,

    /// `run()` was called on an agent that has already left the idle state.
    #[error("Agent cannot run from the {0} state")]
    AlreadyStarted(AgentState),

    /// The transport reported a failed connection attempt.
    #[error("Connection to the broker failed: {0}")]
    Connect(#[source] TransportError),

    /// The action-request subscription could not be established.
    #[error("Failed to subscribe to {topic}: {source}")]
    Subscribe {
        /// Subscription pattern that was rejected.
        topic: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The agent configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors reported by a [`BrokerTransport`](crate::transport::BrokerTransport).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// An operation that needs a live connection was attempted without one.
    #[error("Transport is not connected")]
    NotConnected,

    /// The broker could not be reached.
    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    /// A publish was rejected.
    #[error("Publish to {topic} failed: {reason}")]
    Publish {
        /// Destination topic.
        topic: String,
        /// Transport-provided reason.
        reason: String,
    },

    /// A subscription was rejected.
    #[error("Subscribe to {pattern} failed: {reason}")]
    Subscribe {
        /// Requested topic pattern.
        pattern: String,
        /// Transport-provided reason.
        reason: String,
    },

    /// Any other transport-specific failure.
    #[error("Transport error: {0}")]
    Other(String),
}

/// Errors raised while loading or validating [`AgentConfig`](crate::config::AgentConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`AgentConfig`](crate::config::AgentConfig).
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// XDG base directories could not be resolved.
    #[error("Failed to resolve XDG directories: {0}")]
    Xdg(String),

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while decoding an inbound mesh payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The topic does not belong to any known mesh message kind.
    #[error("Topic {0} is not an agent mesh topic")]
    UnknownTopic(String),

    /// The payload is not valid JSON for the message kind selected by the topic.
    #[error("Malformed payload on {topic}: {source}")]
    Payload {
        /// Topic the payload arrived on.
        topic: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
