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

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::agent::mesh_agent::AgentInner;
use crate::common::TransportError;
use crate::message::PublishOptions;

impl AgentInner {
    /// Publishes the first registration and arms the periodic heartbeat.
    pub(crate) async fn register(self: &Arc<Self>) {
        info!(
            "Registering agent {} every {:?}",
            self.config.agent.name,
            self.config.registration_interval()
        );
        // The first publish is best-effort like every later tick.
        let _ = self.publish_registration().await;
        self.arm_heartbeat();
    }

    pub(crate) async fn publish_registration(&self) -> Result<(), TransportError> {
        let topic = self.topics.registration();
        let payload = match serde_json::to_string(&self.summary()) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize registration summary: {}", e);
                self.stats.record_heartbeat_failure();
                return Err(TransportError::Other(e.to_string()));
            }
        };

        match self
            .transport
            .publish(&topic, payload, PublishOptions::default())
            .await
        {
            Ok(()) => {
                debug!("Agent {} registered", self.config.agent.name);
                self.stats.record_heartbeat();
                Ok(())
            }
            Err(e) => {
                error!("Failed to register agent {}: {}", self.config.agent.name, e);
                self.stats.record_heartbeat_failure();
                Err(e)
            }
        }
    }

    /// Spawns the heartbeat task, replacing any previous one.
    fn arm_heartbeat(self: &Arc<Self>) {
        let period = self.config.registration_interval();
        let agent = Arc::downgrade(self);
        let cancel_token = self.cancellation_token.clone();

        let handle = tokio::spawn(heartbeat_loop(agent, period, cancel_token));
        let previous = self.heartbeat.lock().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

async fn heartbeat_loop(
    agent: Weak<AgentInner>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                trace!("Heartbeat received shutdown signal");
                break;
            }

            _ = ticker.tick() => {
                let Some(agent) = agent.upgrade() else {
                    trace!("Agent dropped, heartbeat exiting");
                    break;
                };
                let _ = agent.publish_registration().await;
            }
        }
    }
}
