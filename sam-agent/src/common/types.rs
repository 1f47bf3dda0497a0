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

//! Type aliases shared across the agent, its payloads and the transport seam.

use tokio::sync::mpsc;

use crate::message::InboundMessage;

/// Parameters supplied with an action request: a JSON object keyed by parameter name.
pub type ActionParams = serde_json::Map<String, serde_json::Value>;

/// Broker user properties attached to a message.
///
/// Treated as opaque pass-through data; the agent only reads `session_id`.
pub type UserProperties = serde_json::Map<String, serde_json::Value>;

/// Structured diagnostic data attached to a failed action response.
pub type ErrorInfo = serde_json::Map<String, serde_json::Value>;

/// Sender half of the single inbound delivery channel bound to a transport connection.
pub type InboundSender = mpsc::UnboundedSender<InboundMessage>;

/// Receiver half of the inbound delivery channel, drained by the agent's listener loop.
pub type InboundReceiver = mpsc::UnboundedReceiver<InboundMessage>;
