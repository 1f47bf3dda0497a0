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
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # SAM Agent
//!
//! A lightweight framework for exposing named, parameterized actions over a
//! Solace Agent Mesh style publish/subscribe broker.
//!
//! ## Key Concepts
//!
//! - **Actions (`Action`)**: a named handler plus the metadata advertised to the
//!   mesh. Discovery (`disabled`) and dispatch (`invocable`) can be toggled at
//!   runtime.
//! - **Agents (`Agent`)**: own a set of actions and run the lifecycle
//!   `Idle → Connecting → Registering → Listening → Stopped`, announcing
//!   themselves on a heartbeat and answering correlated action requests.
//! - **Transport (`BrokerTransport`)**: the publish/subscribe seam. The crate
//!   ships an in-process `InMemoryBroker`; real broker clients implement the trait.
//! - **Topics**: derived from the mesh namespace and the agent name by
//!   [`topics::MeshTopics`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sam_agent::prelude::*;
//!
//! let broker = InMemoryBroker::new();
//! let agent = Agent::new(
//!     AgentConfig::new("echo", "Echoes text back"),
//!     Arc::new(broker.client("echo")),
//! )?;
//! agent.add_action(Action::new(
//!     ActionConfig::new("echo", "Echo the text").with_param("text", "Text to echo"),
//!     |params, _meta| async move {
//!         let text = params.get("text").and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(ActionResponse::new(text))
//!     },
//! ));
//! agent.run().await?;
//! ```

/// Actions: configuration, handlers, responses and discovery summaries.
pub mod action;

/// The agent lifecycle and request dispatch.
pub mod agent;

/// Configuration, errors, logging, topics and shared aliases.
pub(crate) mod common;

/// Payloads exchanged on the mesh.
pub mod message;

/// The broker transport seam and the in-memory broker.
pub mod transport;

pub use common::{config, logging, topics};
pub use common::{
    ActionParams, AgentError, ConfigError, DecodeError, ErrorInfo, InboundReceiver,
    InboundSender, TransportError, UserProperties,
};

/// Commonly used items, for `use sam_agent::prelude::*`.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::action::{Action, ActionConfig, ActionMeta, ActionParam, ActionResponse};
    pub use crate::agent::{Agent, AgentState, DispatchOutcome, DispatchStats};
    pub use crate::common::config::AgentConfig;
    pub use crate::common::topics::MeshTopics;
    pub use crate::common::{ActionParams, AgentError, TransportError, UserProperties};
    pub use crate::message::{InboundMessage, PublishOptions};
    pub use crate::transport::{BrokerTransport, ConnectionState, InMemoryBroker};
}
