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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::ActionParams;

/// Payload of an action request.
///
/// `agent_name` and `action_name` are required; decoding fails without them.
/// The correlation fields are opaque to the agent and echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Addressee, compared verbatim with the agent's configured name.
    pub agent_name: String,
    /// Action to run.
    pub action_name: String,
    /// Parameters; absent or `null` means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_params: Option<ActionParams>,
    /// Caller's action list identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_list_id: Option<Value>,
    /// Position of this action in the caller's list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_idx: Option<Value>,
    /// Originating component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<Value>,
}

impl ActionRequest {
    /// A request for `action_name` on `agent_name` without parameters or correlation data.
    #[must_use]
    pub fn new(agent_name: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            action_name: action_name.into(),
            action_params: None,
            action_list_id: None,
            action_idx: None,
            originator: None,
        }
    }

    /// The request parameters, or an empty map.
    #[must_use]
    pub fn params(&self) -> ActionParams {
        self.action_params.clone().unwrap_or_default()
    }
}
