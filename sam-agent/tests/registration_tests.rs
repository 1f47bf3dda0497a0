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

//! Tests for the registration heartbeat.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use sam_agent::prelude::*;
use sam_test::prelude::*;
use serde_json::Value;

use crate::setup::mesh;
use crate::setup::{actions, initialize_tracing, wait_until};

mod setup;

const REGISTRATION: &str = "test/solace-agent-mesh/v1/register/agent/weather";

fn action_names(payload: &Value) -> Vec<String> {
    payload["actions"]
        .as_array()
        .map(|actions| {
            actions
                .iter()
                .filter_map(|entry| entry.as_object()?.keys().next().cloned())
                .collect()
        })
        .unwrap_or_default()
}

#[sam_test]
async fn test_heartbeats_repeat_byte_identical() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());
    agent.add_action(actions::echo(Arc::new(AtomicUsize::new(0))));
    agent.run().await?;

    assert!(wait_until(|| broker.published_matching(REGISTRATION).len() >= 3).await);
    agent.stop().await;

    let registrations = broker.published_matching(REGISTRATION);
    let first = &registrations[0].payload;
    assert!(registrations.iter().all(|m| &m.payload == first));
    assert!(registrations.iter().all(|m| m.user_properties.is_none()));
    Ok(())
}

#[sam_test]
async fn test_disabling_an_action_updates_the_next_heartbeat() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());
    let echo = agent.add_action(actions::echo(Arc::new(AtomicUsize::new(0))));
    agent.run().await?;

    let latest = || -> Vec<String> {
        broker
            .published_matching(REGISTRATION)
            .last()
            .and_then(|m| m.json().ok())
            .map(|payload| action_names(&payload))
            .unwrap_or_default()
    };
    assert_eq!(latest(), vec!["getForecast", "echo"]);

    echo.set_disabled(true);
    assert!(wait_until(|| latest() == vec!["getForecast"]).await);

    echo.set_disabled(false);
    assert!(wait_until(|| latest() == vec!["getForecast", "echo"]).await);

    assert_eq!(agent.state(), AgentState::Listening);
    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_heartbeat_survives_publish_failures() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());
    agent.run().await?;

    broker.set_available(false);
    assert!(wait_until(|| agent.stats().heartbeat_failures() >= 2).await);
    broker.set_available(true);

    let published = agent.stats().heartbeats_published();
    assert!(wait_until(|| agent.stats().heartbeats_published() > published).await);

    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_manual_registration_reports_errors() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());

    // Not connected yet.
    assert!(matches!(
        agent.publish_registration().await,
        Err(TransportError::NotConnected)
    ));
    assert_eq!(agent.stats().heartbeat_failures(), 1);

    agent.run().await?;
    agent.publish_registration().await?;

    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_actions_added_after_run_are_advertised() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let agent = mesh::agent(&broker, "weather")?;
    agent.add_action(actions::forecast());
    agent.run().await?;

    agent.add_action(actions::whoami());
    assert!(
        wait_until(|| {
            broker
                .published_matching(REGISTRATION)
                .last()
                .and_then(|m| m.json().ok())
                .is_some_and(|payload| action_names(&payload) == vec!["getForecast", "whoami"])
        })
        .await
    );

    agent.stop().await;
    Ok(())
}

#[sam_test]
async fn test_always_open_is_advertised() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = InMemoryBroker::new();
    let config = AgentConfig::new("weather", "Open to everyone")
        .with_namespace(mesh::NAMESPACE)
        .with_always_open(true);
    let agent = mesh::agent_with_config(&broker, config)?;
    agent.add_action(actions::forecast());
    agent.run().await?;

    let registrations = broker.published_matching(REGISTRATION);
    let payload = registrations
        .first()
        .ok_or_else(|| anyhow::anyhow!("no registration published"))?
        .json()?;
    assert_eq!(payload["always_open"], Value::Bool(true));
    assert_eq!(payload["description"], "Open to everyone");

    agent.stop().await;
    Ok(())
}
