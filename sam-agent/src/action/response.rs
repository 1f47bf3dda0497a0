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

use crate::common::ErrorInfo;

/// Context handed to an action handler alongside its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMeta {
    /// Session the request belongs to; empty when the request carried none.
    pub session_id: String,
}

impl ActionMeta {
    /// Creates invocation context for `session_id`.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// What an action handler returns.
///
/// `message` is free-form text (JSON-encoded by convention). `error_info` carries
/// structured diagnostics when the action failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Response body.
    pub message: String,
    /// Optional structured diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<ErrorInfo>,
}

impl ActionResponse {
    /// A successful response carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_info: None,
        }
    }

    /// A failed response with an `error_message` diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>, error_message: impl Into<String>) -> Self {
        let mut info = ErrorInfo::new();
        info.insert(
            "error_message".to_string(),
            serde_json::Value::String(error_message.into()),
        );
        Self {
            message: message.into(),
            error_info: Some(info),
        }
    }

    /// Attaches structured diagnostics.
    #[must_use]
    pub fn with_error_info(mut self, error_info: ErrorInfo) -> Self {
        self.error_info = Some(error_info);
        self
    }

    /// Returns `true` if diagnostics are attached.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error_info.is_some()
    }
}
