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

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::action::Action;
use crate::agent::{AgentState, DispatchOutcome, DispatchStats};
use crate::common::config::AgentConfig;
use crate::common::topics::MeshTopics;
use crate::common::{AgentError, TransportError};
use crate::message::{InboundMessage, RegistrationSummary};
use crate::transport::BrokerTransport;

/// A mesh participant exposing a set of [`Action`]s over a broker transport.
///
/// `Agent` is a cheap, cloneable handle. Clones share the same action set,
/// lifecycle state and background tasks.
///
/// ```rust,ignore
/// let broker = InMemoryBroker::new();
/// let agent = Agent::new(AgentConfig::new("weather", "Forecasts"), Arc::new(broker.client("weather")))?;
/// agent.add_action(forecast_action());
/// agent.run().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) inner: Arc<AgentInner>,
}

#[derive(Debug)]
pub(crate) struct AgentInner {
    pub(crate) config: AgentConfig,
    pub(crate) topics: MeshTopics,
    pub(crate) actions: RwLock<Vec<Arc<Action>>>,
    pub(crate) transport: Arc<dyn BrokerTransport>,
    pub(crate) state: Mutex<AgentState>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) tracker: TaskTracker,
    pub(crate) heartbeat: Mutex<Option<JoinHandle<()>>>,
    pub(crate) listener: Mutex<Option<JoinHandle<()>>>,
    pub(crate) invocation_limit: Option<Arc<Semaphore>>,
    pub(crate) stats: DispatchStats,
}

impl Agent {
    /// Creates an idle agent bound to `transport`.
    ///
    /// # Errors
    ///
    /// [`AgentError::Config`] when the configuration fails validation.
    pub fn new(config: AgentConfig, transport: Arc<dyn BrokerTransport>) -> Result<Self, AgentError> {
        config.validate()?;
        let topics = MeshTopics::new(config.mesh.namespace.clone(), config.agent.name.clone());
        let invocation_limit = config
            .limits
            .max_concurrent_invocations
            .map(|limit| Arc::new(Semaphore::new(limit)));

        debug!(agent = %config.agent.name, namespace = %config.mesh.namespace, "Agent created");
        Ok(Self {
            inner: Arc::new(AgentInner {
                config,
                topics,
                actions: RwLock::new(Vec::new()),
                transport,
                state: Mutex::new(AgentState::Idle),
                cancellation_token: CancellationToken::new(),
                tracker: TaskTracker::new(),
                heartbeat: Mutex::new(None),
                listener: Mutex::new(None),
                invocation_limit,
                stats: DispatchStats::default(),
            }),
        })
    }

    /// Registers an action and returns a shared handle to it.
    ///
    /// Actions added after `run()` are dispatched and advertised from the next
    /// request and heartbeat onward. Names are not deduplicated; the first
    /// registered action with a given name receives its requests.
    pub fn add_action(&self, action: Action) -> Arc<Action> {
        let action = Arc::new(action);
        debug!(action = %action.name(), "Adding action");
        self.inner.actions.write().push(Arc::clone(&action));
        action
    }

    /// Snapshot of the registered actions in registration order.
    #[must_use]
    pub fn actions(&self) -> Vec<Arc<Action>> {
        self.inner.actions.read().clone()
    }

    /// The first registered action named `name`.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Arc<Action>> {
        self.inner.find_action(name)
    }

    /// Removes every registered action.
    pub fn clear_actions(&self) {
        self.inner.actions.write().clear();
    }

    /// The registration summary as it would be published right now.
    #[must_use]
    pub fn summary(&self) -> RegistrationSummary {
        self.inner.summary()
    }

    /// Connects, registers and starts listening.
    ///
    /// Returns once the agent is listening; the heartbeat and the listener keep
    /// running in the background until [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// - [`AgentError::NoActions`] when no action is registered. The transport is not touched.
    /// - [`AgentError::AlreadyStarted`] unless the agent is idle.
    /// - [`AgentError::Connect`] when the transport fails to connect. The agent returns to
    ///   idle and does not retry.
    /// - [`AgentError::Subscribe`] when the action-request subscription is refused.
    ///
    /// A [`stop`](Self::stop) that lands while `run` is in progress wins: `run`
    /// returns `Ok(())` and leaves the transport disconnected.
    #[instrument(skip(self), fields(agent = %self.inner.config.agent.name))]
    pub async fn run(&self) -> Result<(), AgentError> {
        if self.inner.actions.read().is_empty() {
            error!("No actions found. Agent will not run");
            return Err(AgentError::NoActions);
        }
        self.inner.transition(AgentState::Idle, AgentState::Connecting)?;

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        info!("Connecting to the broker...");
        if let Err(e) = self.inner.transport.connect(inbound_tx).await {
            error!("Connection to the broker failed: {}", e);
            self.inner.set_state_unless_stopped(AgentState::Idle);
            return Err(AgentError::Connect(e));
        }
        info!("Successfully connected to the broker");

        if !self.inner.set_state_unless_stopped(AgentState::Registering) {
            debug!("Agent stopped while connecting");
            // stop() may have disconnected before the connection existed.
            if let Err(e) = self.inner.transport.disconnect().await {
                warn!("Failed to disconnect after stop: {}", e);
            }
            return Ok(());
        }
        self.inner.register().await;

        if let Err(e) = self.inner.start_listening(inbound_rx).await {
            if self.state() == AgentState::Stopped {
                debug!("Agent stopped while subscribing");
                return Ok(());
            }
            error!("{}", e);
            self.inner.abort_background_tasks();
            if let Err(e) = self.inner.transport.disconnect().await {
                warn!("Failed to disconnect after subscription failure: {}", e);
            }
            self.inner.set_state_unless_stopped(AgentState::Idle);
            return Err(e);
        }

        self.inner.set_state_unless_stopped(AgentState::Listening);
        Ok(())
    }

    /// Publishes the registration summary once.
    ///
    /// Failures are logged and counted in [`DispatchStats::heartbeat_failures`].
    ///
    /// # Errors
    ///
    /// The transport's publish error, for callers that want to observe it.
    pub async fn publish_registration(&self) -> Result<(), TransportError> {
        self.inner.publish_registration().await
    }

    /// Dispatches one inbound message as if it had arrived from the broker.
    pub async fn handle_message(&self, message: InboundMessage) -> DispatchOutcome {
        self.inner.handle_message(message).await
    }

    /// Cancels the heartbeat and listener and disconnects the transport.
    ///
    /// Calling `stop` on a stopped agent does nothing. In-flight dispatches are
    /// not cancelled; their responses may fail to publish.
    #[instrument(skip(self), fields(agent = %self.inner.config.agent.name))]
    pub async fn stop(&self) {
        {
            let mut state = self.inner.state.lock();
            if *state == AgentState::Stopped {
                debug!("Agent already stopped");
                return;
            }
            *state = AgentState::Stopped;
        }

        self.inner.cancellation_token.cancel();
        self.inner.abort_background_tasks();
        self.inner.tracker.close();

        if let Err(e) = self.inner.transport.disconnect().await {
            warn!("Failed to disconnect from the broker: {}", e);
        }
        info!("Agent stopped");
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        *self.inner.state.lock()
    }

    /// Dispatch and heartbeat counters.
    #[must_use]
    pub fn stats(&self) -> &DispatchStats {
        &self.inner.stats
    }

    /// Number of dispatch tasks still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// The configuration the agent was created with.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.inner.config
    }

    /// Topic names derived from the namespace and agent name.
    #[must_use]
    pub fn topics(&self) -> &MeshTopics {
        &self.inner.topics
    }
}

impl AgentInner {
    pub(crate) fn find_action(&self, name: &str) -> Option<Arc<Action>> {
        self.actions
            .read()
            .iter()
            .find(|action| action.name() == name)
            .cloned()
    }

    pub(crate) fn summary(&self) -> RegistrationSummary {
        RegistrationSummary {
            agent_name: self.config.agent.name.clone(),
            description: self.config.agent.description.clone(),
            always_open: self.config.agent.always_open,
            actions: self.actions.read().iter().filter_map(|a| a.info()).collect(),
        }
    }

    fn transition(&self, from: AgentState, to: AgentState) -> Result<(), AgentError> {
        let mut state = self.state.lock();
        if *state != from {
            warn!("Agent cannot move from {} to {}", *state, to);
            return Err(AgentError::AlreadyStarted(*state));
        }
        *state = to;
        Ok(())
    }

    /// Returns `false` without touching the state once the agent is stopped.
    fn set_state_unless_stopped(&self, to: AgentState) -> bool {
        let mut state = self.state.lock();
        if *state == AgentState::Stopped {
            return false;
        }
        *state = to;
        true
    }

    fn abort_background_tasks(&self) {
        let heartbeat = self.heartbeat.lock().take();
        if let Some(handle) = heartbeat {
            handle.abort();
        }
        let listener = self.listener.lock().take();
        if let Some(handle) = listener {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionConfig, ActionResponse};
    use crate::transport::InMemoryBroker;

    use super::*;

    fn agent(broker: &InMemoryBroker) -> Agent {
        Agent::new(
            AgentConfig::new("weather", "Weather forecasts"),
            Arc::new(broker.client("weather")),
        )
        .unwrap()
    }

    fn named(name: &str) -> Action {
        Action::new(ActionConfig::new(name, "test action"), |_params, _meta| async {
            Ok(ActionResponse::new("ok"))
        })
    }

    #[test]
    fn test_new_rejects_blank_name() {
        let broker = InMemoryBroker::new();
        let result = Agent::new(AgentConfig::new("  ", ""), Arc::new(broker.client("blank")));
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_action_lookup_returns_first_registered() {
        let broker = InMemoryBroker::new();
        let agent = agent(&broker);
        let first = agent.add_action(named("lookup"));
        agent.add_action(named("lookup"));

        let found = agent.action("lookup").unwrap();
        assert!(Arc::ptr_eq(&first, &found));
        assert_eq!(agent.actions().len(), 2);

        agent.clear_actions();
        assert!(agent.action("lookup").is_none());
    }

    #[test]
    fn test_summary_skips_disabled_actions() {
        let broker = InMemoryBroker::new();
        let agent = agent(&broker);
        agent.add_action(named("a"));
        let b = agent.add_action(named("b"));
        b.set_disabled(true);

        let summary = agent.summary();
        assert_eq!(summary.agent_name, "weather");
        assert_eq!(summary.actions.len(), 1);
        assert_eq!(summary.actions[0].name, "a");
    }

    #[tokio::test]
    async fn test_run_without_actions_leaves_transport_untouched() {
        let broker = InMemoryBroker::new();
        let agent = agent(&broker);

        assert!(matches!(agent.run().await, Err(AgentError::NoActions)));
        assert_eq!(agent.state(), AgentState::Idle);
        assert_eq!(broker.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let broker = InMemoryBroker::new();
        let agent = agent(&broker);
        agent.add_action(named("a"));

        agent.run().await.unwrap();
        assert_eq!(agent.state(), AgentState::Listening);
        assert!(matches!(
            agent.run().await,
            Err(AgentError::AlreadyStarted(AgentState::Listening))
        ));
        agent.stop().await;
    }
}
