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

/// Counters describing what an agent has done since it was created.
#[derive(Debug, Default)]
pub struct DispatchStats {
    messages_received: AtomicUsize,
    messages_dropped: AtomicUsize,
    responses_published: AtomicUsize,
    handler_failures: AtomicUsize,
    publish_failures: AtomicUsize,
    heartbeats_published: AtomicUsize,
    heartbeat_failures: AtomicUsize,
}

impl DispatchStats {
    /// Action-request messages taken off the inbound channel.
    #[must_use]
    pub fn messages_received(&self) -> usize {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Requests dropped without a response: malformed, misaddressed or unknown.
    #[must_use]
    pub fn messages_dropped(&self) -> usize {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    /// Responses handed to the transport successfully, error responses included.
    #[must_use]
    pub fn responses_published(&self) -> usize {
        self.responses_published.load(Ordering::Relaxed)
    }

    /// Handler invocations that returned an error or panicked.
    #[must_use]
    pub fn handler_failures(&self) -> usize {
        self.handler_failures.load(Ordering::Relaxed)
    }

    /// Responses the transport refused.
    #[must_use]
    pub fn publish_failures(&self) -> usize {
        self.publish_failures.load(Ordering::Relaxed)
    }

    /// Registration summaries published.
    #[must_use]
    pub fn heartbeats_published(&self) -> usize {
        self.heartbeats_published.load(Ordering::Relaxed)
    }

    /// Registration summaries the transport refused.
    #[must_use]
    pub fn heartbeat_failures(&self) -> usize {
        self.heartbeat_failures.load(Ordering::Relaxed)
    }

    pub(crate) fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response(&self) {
        self.responses_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_heartbeat(&self) {
        self.heartbeats_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_heartbeat_failure(&self) {
        self.heartbeat_failures.fetch_add(1, Ordering::Relaxed);
    }
}
