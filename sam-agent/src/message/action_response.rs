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

use crate::action::ActionResponse;
use crate::common::{ActionParams, ErrorInfo};
use crate::message::ActionRequest;

/// Payload published in answer to an [`ActionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponseMessage {
    /// Echoed action name.
    pub action_name: String,
    /// Echoed parameters (empty when the request had none).
    pub action_params: ActionParams,
    /// Handler output.
    pub message: String,
    /// Handler diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<ErrorInfo>,
    /// Echoed correlation field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_list_id: Option<Value>,
    /// Echoed correlation field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_idx: Option<Value>,
    /// Echoed correlation field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<Value>,
}

impl ActionResponseMessage {
    /// Pairs a handler result with the request it answers.
    #[must_use]
    pub fn for_request(request: &ActionRequest, response: ActionResponse) -> Self {
        Self {
            action_name: request.action_name.clone(),
            action_params: request.params(),
            message: response.message,
            error_info: response.error_info,
            action_list_id: request.action_list_id.clone(),
            action_idx: request.action_idx.clone(),
            originator: request.originator.clone(),
        }
    }
}
