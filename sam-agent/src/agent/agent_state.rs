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

use std::fmt;

/// Lifecycle position of an [`Agent`](crate::agent::Agent).
///
/// `Idle → Connecting → Registering → Listening`, with `Stopped` reachable from
/// any of them. A failed connection attempt returns the agent to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgentState {
    /// Created, not yet running.
    #[default]
    Idle,
    /// Waiting for the transport to report the connection result.
    Connecting,
    /// Connected; publishing the first registration and arming the heartbeat.
    Registering,
    /// Subscribed and dispatching action requests.
    Listening,
    /// Stopped. Terminal.
    Stopped,
}

impl AgentState {
    /// Returns `true` between a successful connect and `stop()`.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Registering | Self::Listening)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::Listening => "listening",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
