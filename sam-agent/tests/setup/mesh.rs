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

use std::sync::Arc;
use std::time::Duration;

use sam_agent::prelude::*;
use sam_agent::transport::InMemoryTransport;
use sam_agent::InboundReceiver;
use serde_json::Value;
use tokio::sync::mpsc;

/// Namespace used by tests that exercise namespaced topics.
pub const NAMESPACE: &str = "test/";

/// Builds an agent named `name` on `broker` with a 50ms heartbeat.
pub fn agent(broker: &InMemoryBroker, name: &str) -> anyhow::Result<Agent> {
    let config = AgentConfig::new(name, format!("{name} test agent"))
        .with_namespace(NAMESPACE)
        .with_registration_interval(Duration::from_millis(50));
    agent_with_config(broker, config)
}

/// Builds an agent from an explicit configuration.
pub fn agent_with_config(broker: &InMemoryBroker, config: AgentConfig) -> anyhow::Result<Agent> {
    let transport = broker.client(config.agent.name.clone());
    Ok(Agent::new(config, Arc::new(transport))?)
}

/// The topic an orchestrator would use to call `action` on the agent `normalized`.
pub fn request_topic(normalized: &str, action: &str) -> String {
    format!("{NAMESPACE}solace-agent-mesh/v1/actionRequest/orchestrator/agent/{normalized}/{action}")
}

/// A connected client subscribed to every action response.
#[derive(Debug)]
pub struct Requester {
    pub transport: InMemoryTransport,
    pub responses: InboundReceiver,
}

impl Requester {
    pub async fn connect(broker: &InMemoryBroker) -> anyhow::Result<Self> {
        Self::connect_in(broker, NAMESPACE).await
    }

    pub async fn connect_in(broker: &InMemoryBroker, namespace: &str) -> anyhow::Result<Self> {
        let transport = broker.client("orchestrator");
        let (tx, responses) = mpsc::unbounded_channel();
        transport.connect(tx).await?;
        transport
            .subscribe(&format!("{namespace}solace-agent-mesh/v1/actionResponse/>"))
            .await?;
        Ok(Self {
            transport,
            responses,
        })
    }

    pub async fn send(&self, topic: &str, payload: Value) -> anyhow::Result<()> {
        self.transport
            .publish(topic, payload.to_string(), PublishOptions::default())
            .await?;
        Ok(())
    }

    pub async fn send_with_properties(
        &self,
        topic: &str,
        payload: Value,
        properties: UserProperties,
    ) -> anyhow::Result<()> {
        self.transport
            .publish(
                topic,
                payload.to_string(),
                PublishOptions::with_user_properties(properties),
            )
            .await?;
        Ok(())
    }

    /// Waits up to two seconds for the next response.
    pub async fn next_response(&mut self) -> anyhow::Result<InboundMessage> {
        tokio::time::timeout(Duration::from_secs(2), self.responses.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("response channel closed"))
    }
}
