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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sam_agent::prelude::*;

/// An action that answers `"echo: <text>"` and counts its invocations.
pub fn echo(calls: Arc<AtomicUsize>) -> Action {
    Action::new(
        ActionConfig::new("echo", "Echo the text back").with_param("text", "Text to echo"),
        move |params, _meta| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let text = params
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                Ok(ActionResponse::new(format!("echo: {text}")))
            }
        },
    )
}

/// An action that reports the session id it was invoked with.
pub fn whoami() -> Action {
    Action::new(
        ActionConfig::new("whoami", "Report the caller's session"),
        |_params, meta| async move { Ok(ActionResponse::new(meta.session_id)) },
    )
}

/// The forecast action used throughout the registration tests.
pub fn forecast() -> Action {
    Action::new(
        ActionConfig::new("getForecast", "Get the weather forecast for a given location")
            .with_param("location", "The location to get the forecast for")
            .with_param("days", "Number of days for the forecast (1-10), default 3"),
        |_params, _meta| async { Ok(ActionResponse::new("sunny")) },
    )
}
