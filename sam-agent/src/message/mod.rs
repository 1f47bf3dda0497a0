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

//! Wire payloads exchanged on the mesh and the transport-level message envelope.
//!
//! Payloads are JSON text. Inbound payloads are validated at the boundary by
//! [`MeshMessage::decode`]; outbound payloads are built from typed structs.

pub use action_request::ActionRequest;
pub use action_response::ActionResponseMessage;
pub use inbound::{InboundMessage, PublishOptions, SESSION_ID_PROPERTY};
pub use mesh_message::MeshMessage;
pub use registration::RegistrationSummary;

mod action_request;
mod action_response;
mod inbound;
mod mesh_message;
mod registration;
