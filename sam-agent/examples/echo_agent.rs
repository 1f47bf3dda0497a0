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

//! Runs an echo agent on the in-memory broker and sends it one request.
//!
//! Configuration is read from `$XDG_CONFIG_HOME/sam-agent/agent.toml` when present.
//!
//! ```sh
//! cargo run -p sam-agent --example echo_agent
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sam_agent::logging::init_tracing;
use sam_agent::prelude::*;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AgentConfig::load("sam-agent")?;
    if config.agent.name.is_empty() {
        config.agent.name = "echo".to_string();
        config.agent.description = "Echoes text and tells the time".to_string();
    }
    let _guard = init_tracing(&config.tracing)?;

    let broker = InMemoryBroker::new();
    let agent = Agent::new(config, Arc::new(broker.client("agent")))?;

    agent.add_action(Action::new(
        ActionConfig::new("echo", "Echo the text back")
            .with_param("text", "Text to echo")
            .with_example("echo hello"),
        |params, meta| async move {
            let text = params
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("missing text parameter"))?;
            info!(session_id = %meta.session_id, "Echoing {}", text);
            Ok(ActionResponse::new(text))
        },
    ));
    agent.add_action(Action::new(
        ActionConfig::new("clock", "Seconds since the Unix epoch"),
        |_params, _meta| async {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
            Ok(ActionResponse::new(now.as_secs().to_string()))
        },
    ));

    agent.run().await?;

    // Play the orchestrator: call `echo` and wait for the answer.
    let orchestrator = broker.client("orchestrator");
    let (tx, mut responses) = mpsc::unbounded_channel();
    orchestrator.connect(tx).await?;
    let namespace = agent.topics().namespace().to_string();
    orchestrator
        .subscribe(&format!("{namespace}solace-agent-mesh/v1/actionResponse/>"))
        .await?;

    let mut properties = UserProperties::new();
    properties.insert("session_id".to_string(), json!("demo-session"));
    let request = json!({
        "agent_name": agent.config().agent.name,
        "action_name": "echo",
        "action_params": {"text": "hello mesh"},
        "action_list_id": "list-1",
        "action_idx": 0,
        "originator": "echo_agent demo"
    });
    orchestrator
        .publish(
            &format!(
                "{namespace}solace-agent-mesh/v1/actionRequest/demo/agent/{}/echo",
                agent.topics().normalized_name()
            ),
            request.to_string(),
            PublishOptions::with_user_properties(properties),
        )
        .await?;

    match tokio::time::timeout(Duration::from_secs(2), responses.recv()).await {
        Ok(Some(response)) => println!("{} -> {}", response.topic, response.payload),
        Ok(None) => println!("response channel closed"),
        Err(_) => println!("no response within 2s"),
    }

    println!(
        "summary: {}",
        serde_json::to_string_pretty(&agent.summary())?
    );

    agent.stop().await;
    orchestrator.disconnect().await?;
    Ok(())
}
