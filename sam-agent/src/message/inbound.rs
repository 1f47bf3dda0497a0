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

use crate::common::UserProperties;

/// User property carrying the caller's session identifier.
pub const SESSION_ID_PROPERTY: &str = "session_id";

/// A message delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload text.
    pub payload: String,
    /// Broker user properties, passed back unchanged on the response.
    pub user_properties: UserProperties,
}

impl InboundMessage {
    /// Creates a message without user properties.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            user_properties: UserProperties::new(),
        }
    }

    /// Attaches user properties.
    #[must_use]
    pub fn with_user_properties(mut self, user_properties: UserProperties) -> Self {
        self.user_properties = user_properties;
        self
    }

    /// The `session_id` user property, or an empty string when absent or not text.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.user_properties
            .get(SESSION_ID_PROPERTY)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }
}

/// Per-publish options understood by every transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishOptions {
    /// User properties to attach to the outgoing message.
    pub user_properties: Option<UserProperties>,
}

impl PublishOptions {
    /// Options echoing `user_properties` on the outgoing message.
    #[must_use]
    pub fn with_user_properties(user_properties: UserProperties) -> Self {
        Self {
            user_properties: Some(user_properties),
        }
    }
}
