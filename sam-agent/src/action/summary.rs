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

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Discovery entry for one action.
///
/// Serializes as a single-key object keyed by the action name:
///
/// ```json
/// { "getForecast": { "desc": "...", "params": ["location (The location)", "days (Number of days)"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSummary {
    /// Action name, used as the object key.
    pub name: String,
    /// Everything advertised under that key.
    pub details: ActionDetails,
}

/// Body of an [`ActionSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDetails {
    /// Action description.
    pub desc: String,
    /// Parameters rendered as `"name (desc)"`, in declared order.
    pub params: Vec<String>,
    /// Example invocations, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    /// Required scopes, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scopes: Option<Vec<String>>,
}

impl Serialize for ActionSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.details)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActionSummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, ActionDetails>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(D::Error::invalid_length(
                entries.len(),
                &"an object with exactly one action entry",
            ));
        }
        entries
            .into_iter()
            .next()
            .map(|(name, details)| Self { name, details })
            .ok_or_else(|| D::Error::custom("empty action summary"))
    }
}
