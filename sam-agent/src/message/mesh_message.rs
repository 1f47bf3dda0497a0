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

use serde::de::DeserializeOwned;

use crate::common::topics::{
    ACTION_REQUEST_SEGMENT, ACTION_RESPONSE_SEGMENT, REGISTRATION_SEGMENT,
};
use crate::common::DecodeError;
use crate::message::{ActionRequest, ActionResponseMessage, RegistrationSummary};

/// A decoded mesh payload, discriminated by the topic it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshMessage {
    /// Request to run an action.
    ActionRequest(ActionRequest),
    /// Answer to an earlier request.
    ActionResponse(ActionResponseMessage),
    /// An agent's heartbeat announcement.
    Registration(RegistrationSummary),
}

impl MeshMessage {
    /// Decodes `payload` according to the message kind `topic` identifies.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnknownTopic`] if the topic is not a mesh topic and
    /// [`DecodeError::Payload`] if the payload is not valid JSON for that kind,
    /// including a missing required field.
    pub fn decode(topic: &str, payload: &str) -> Result<Self, DecodeError> {
        if topic.contains(ACTION_REQUEST_SEGMENT) {
            parse(topic, payload).map(Self::ActionRequest)
        } else if topic.contains(ACTION_RESPONSE_SEGMENT) {
            parse(topic, payload).map(Self::ActionResponse)
        } else if topic.contains(REGISTRATION_SEGMENT) {
            parse(topic, payload).map(Self::Registration)
        } else {
            Err(DecodeError::UnknownTopic(topic.to_string()))
        }
    }
}

fn parse<T: DeserializeOwned>(topic: &str, payload: &str) -> Result<T, DecodeError> {
    serde_json::from_str(payload).map_err(|source| DecodeError::Payload {
        topic: topic.to_string(),
        source,
    })
}
