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

//! Tests for the connect, register, listen and stop lifecycle.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use sam_agent::prelude::*;
use sam_agent::transport::InMemoryTransport;
use sam_agent::InboundSender;
use sam_test::prelude::*;
use serde_json::json;

use crate::setup::mesh::{self, Requester};
use crate::setup::{actions, initialize_tracing, wait_until};

mod setup;

#[sam_test]
async fn test_run_without_actions_fails_fast() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;

    let result = agent.run().await;
    assert!(matches!(result, Err(AgentError::NoActions)));
    assert_eq!(agent.state(), AgentState::Idle);
    assert_eq!(broker.client_count(), 0);
    assert_eq!(broker.publish_count(), 0);
    Ok(())
}

#[sam_test]
async fn test_run_connects_registers_and_listens() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());

    agent.run().await?;
    assert_eq!(agent.state(), AgentState::Listening);
    assert_eq!(broker.client_count(), 1);

    // The first registration goes out before run() returns.
    let registrations =
        broker.published_matching("test/solace-agent-mesh/v1/register/agent/weather");
    assert!(!registrations.is_empty());
    assert_eq!(
        registrations[0].json()?,
        json!({
            "agent_name": "weather",
            "description": "weather test agent",
            "always_open": false,
            "actions": [{
                "getForecast": {
                    "desc": "Get the weather forecast for a given location",
                    "params": [
                        "location (The location to get the forecast for)",
                        "days (Number of days for the forecast (1-10), default 3)"
                    ]
                }
            }]
        })
    );

    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_connection_failure_returns_to_idle() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    broker.set_available(false);
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());

    let result = agent.run().await;
    assert!(matches!(result, Err(AgentError::Connect(TransportError::Unavailable(_)))));
    assert_eq!(agent.state(), AgentState::Idle);
    assert_eq!(broker.publish_count(), 0);

    // Nothing was armed, so a later attempt starts cleanly.
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(agent.stats().heartbeats_published(), 0);

    broker.set_available(true);
    agent.run().await?;
    assert_eq!(agent.state(), AgentState::Listening);

    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_second_run_is_rejected() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());

    agent.run().await?;
    let result = agent.run().await;
    assert!(matches!(result, Err(AgentError::AlreadyStarted(AgentState::Listening))));

    agent.stop().await;
    let result = agent.run().await;
    assert!(matches!(result, Err(AgentError::AlreadyStarted(AgentState::Stopped))));
    Ok(())
}

#[sam_test]
async fn test_stop_is_idempotent_and_halts_background_work() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::echo(Arc::new(AtomicUsize::new(0))));
    agent.run().await?;

    assert!(wait_until(|| agent.stats().heartbeats_published() >= 2).await);

    agent.stop().await;
    agent.stop().await;
    assert_eq!(agent.state(), AgentState::Stopped);
    assert_eq!(broker.client_count(), 0);

    let heartbeats = agent.stats().heartbeats_published();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(agent.stats().heartbeats_published(), heartbeats);

    // Requests published after stop reach nobody.
    let requester = Requester::connect(&broker).await?;
    requester
        .send(
            &mesh::request_topic("weather", "echo"),
            json!({"agent_name": "weather", "action_name": "echo"}),
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(agent.stats().messages_received(), 0);
    Ok(())
}

#[sam_test]
async fn test_stop_before_run_is_terminal() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());

    agent.stop().await;
    assert_eq!(agent.state(), AgentState::Stopped);
    assert!(agent.run().await.is_err());
    assert_eq!(broker.publish_count(), 0);
    Ok(())
}

#[sam_test]
async fn test_clones_share_the_same_agent() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    let handle = agent.clone();
    handle.add_action(actions::forecast());

    agent.run().await?;
    assert_eq!(handle.state(), AgentState::Listening);
    assert_eq!(handle.actions().len(), 1);

    handle.stop().await;
    assert_eq!(agent.state(), AgentState::Stopped);
    Ok(())
}

/// Delays `connect` so a `stop()` can land while the connection is being opened.
#[derive(Debug)]
struct SlowConnect {
    inner: InMemoryTransport,
    delay: Duration,
}

#[async_trait]
impl BrokerTransport for SlowConnect {
    async fn connect(&self, inbound: InboundSender) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        self.inner.connect(inbound).await
    }

    async fn publish(
        &self,
        topic: &str,
        payload: String,
        options: PublishOptions,
    ) -> Result<(), TransportError> {
        self.inner.publish(topic, payload, options).await
    }

    async fn subscribe(&self, topic_pattern: &str) -> Result<(), TransportError> {
        self.inner.subscribe(topic_pattern).await
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.inner.disconnect().await
    }

    fn state(&self) -> ConnectionState {
        self.inner.state()
    }
}

#[sam_test]
async fn test_stop_during_connect_leaves_transport_disconnected() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let transport = Arc::new(SlowConnect {
        inner: broker.client("weather"),
        delay: Duration::from_millis(100),
    });
    let agent = Agent::new(
        AgentConfig::new("weather", "slow").with_namespace(mesh::NAMESPACE),
        transport.clone(),
    )?;
    agent.add_action(actions::forecast());

    let running = agent.clone();
    let run = tokio::spawn(async move { running.run().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(agent.state(), AgentState::Connecting);
    agent.stop().await;

    run.await??;
    assert_eq!(agent.state(), AgentState::Stopped);
    assert_eq!(transport.state(), ConnectionState::Disconnected);
    assert_eq!(broker.client_count(), 0);
    assert_eq!(agent.stats().heartbeats_published(), 0);
    Ok(())
}

#[sam_test]
async fn test_in_flight_tracks_dispatches_across_stop() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(Action::new(
        ActionConfig::new("slow", "Sleeps briefly"),
        |_params, _meta| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(ActionResponse::new("done"))
        },
    ));
    agent.run().await?;
    assert_eq!(agent.in_flight(), 0);

    let requester = Requester::connect(&broker).await?;
    requester
        .send(
            &mesh::request_topic("weather", "slow"),
            json!({"agent_name": "weather", "action_name": "slow"}),
        )
        .await?;
    assert!(wait_until(|| agent.in_flight() == 1).await);

    // In-flight work is not cancelled by stop.
    agent.stop().await;
    assert!(wait_until(|| agent.in_flight() == 0).await);
    assert_eq!(agent.stats().handler_failures(), 0);
    Ok(())
}
