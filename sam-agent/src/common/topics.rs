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

//! Topic construction and wildcard matching for the agent mesh.
//!
//! Every topic an agent touches is rooted at [`TOPIC_ROOT`] and prefixed with the
//! configured namespace. Levels are separated by `/`. Subscription patterns use the
//! broker's wildcard syntax: `*` matches a single level (or, as `prefix*`, a single
//! level starting with `prefix`) and a trailing `>` matches one or more levels.

/// Root of every mesh topic, versioned.
pub const TOPIC_ROOT: &str = "solace-agent-mesh/v1";

/// Literal segment identifying action-request traffic.
pub const ACTION_REQUEST_SEGMENT: &str = "solace-agent-mesh/v1/actionRequest";

/// Literal segment identifying action-response traffic.
pub const ACTION_RESPONSE_SEGMENT: &str = "solace-agent-mesh/v1/actionResponse";

/// Literal segment identifying agent registration traffic.
pub const REGISTRATION_SEGMENT: &str = "solace-agent-mesh/v1/register/agent";

/// Converts a display name into the form used inside subscription topics.
///
/// Spaces and hyphens become underscores and the result is lowercased, so
/// `"Weather Agent-2"` becomes `"weather_agent_2"`.
#[must_use]
pub fn normalize_agent_name(name: &str) -> String {
    name.replace([' ', '-'], "_").to_lowercase()
}

/// Returns `true` if `topic` carries an action request.
#[must_use]
pub fn is_action_request(topic: &str) -> bool {
    topic.contains(ACTION_REQUEST_SEGMENT)
}

/// Returns `true` if `topic` is matched by the subscription `pattern`.
#[must_use]
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let mut pattern_levels = pattern.split('/').peekable();
    let mut topic_levels = topic.split('/');

    while let Some(expected) = pattern_levels.next() {
        if expected == ">" && pattern_levels.peek().is_none() {
            // Needs at least one remaining level.
            return topic_levels.next().is_some();
        }

        let Some(actual) = topic_levels.next() else {
            return false;
        };

        let level_matches = match expected.strip_suffix('*') {
            Some(prefix) => actual.starts_with(prefix),
            None => expected == actual,
        };
        if !level_matches {
            return false;
        }
    }

    topic_levels.next().is_none()
}

/// The fixed set of topics one agent publishes to and subscribes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTopics {
    namespace: String,
    agent_name: String,
    normalized_name: String,
}

impl MeshTopics {
    /// Builds the topic set for `agent_name` under `namespace` (may be empty).
    #[must_use]
    pub fn new(namespace: impl Into<String>, agent_name: impl Into<String>) -> Self {
        let agent_name = agent_name.into();
        Self {
            namespace: namespace.into(),
            normalized_name: normalize_agent_name(&agent_name),
            agent_name,
        }
    }

    /// The namespace prefix applied to every topic.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The agent name as published in the registration summary.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// The agent name as it appears in the request subscription.
    #[must_use]
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Topic the registration summary is announced on.
    #[must_use]
    pub fn registration(&self) -> String {
        format!("{}{REGISTRATION_SEGMENT}/{}", self.namespace, self.agent_name)
    }

    /// Subscription pattern catching every action request addressed to this agent.
    #[must_use]
    pub fn action_request_subscription(&self) -> String {
        format!(
            "{}{ACTION_REQUEST_SEGMENT}/*/*/{}/>",
            self.namespace, self.normalized_name
        )
    }

    /// Topic the response to `action_name` is published on.
    #[must_use]
    pub fn action_response(&self, action_name: &str) -> String {
        format!(
            "{}{ACTION_RESPONSE_SEGMENT}/agent/{}/{action_name}",
            self.namespace, self.agent_name
        )
    }
}
