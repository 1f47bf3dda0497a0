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

/// Describes one parameter an action accepts, for discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParam {
    /// Parameter name as it appears in `action_params`.
    pub name: String,
    /// Human-readable description.
    pub desc: String,
    /// Optional type hint. Carried for tooling; not rendered in the summary.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ActionParam {
    /// Creates an untyped parameter descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            kind: None,
        }
    }

    /// Renders the descriptor as `"name (desc)"`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} ({})", self.name, self.desc)
    }
}

/// Static description of an action.
///
/// `disabled` and `invocable` are independent: a disabled action is left out of
/// the registration summary but still answers requests unless `invocable` is
/// cleared as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Name used for lookup. Expected to be unique within an agent.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters, in the order they are advertised.
    #[serde(default)]
    pub params: Vec<ActionParam>,
    /// Example invocations for discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    /// Scopes a caller is expected to hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scopes: Option<Vec<String>>,
    /// Omit the action from the registration summary.
    #[serde(default)]
    pub disabled: bool,
    /// Accept requests for the action.
    #[serde(default = "default_invocable")]
    pub invocable: bool,
}

const fn default_invocable() -> bool {
    true
}

impl ActionConfig {
    /// Creates an enabled, invocable action description without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            examples: None,
            required_scopes: None,
            disabled: false,
            invocable: true,
        }
    }

    /// Appends a parameter descriptor.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, desc: impl Into<String>) -> Self {
        self.params.push(ActionParam::new(name, desc));
        self
    }

    /// Appends an example invocation.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.get_or_insert_with(Vec::new).push(example.into());
        self
    }

    /// Appends a required scope.
    #[must_use]
    pub fn with_required_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scopes
            .get_or_insert_with(Vec::new)
            .push(scope.into());
        self
    }

    /// Marks the action as hidden from discovery.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Marks the action as refusing requests.
    #[must_use]
    pub fn not_invocable(mut self) -> Self {
        self.invocable = false;
        self
    }
}
