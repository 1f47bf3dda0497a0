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

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::action::{Action, ActionMeta, ActionResponse};
use crate::agent::mesh_agent::AgentInner;
use crate::common::topics::is_action_request;
use crate::common::{ActionParams, AgentError, InboundReceiver};
use crate::message::{ActionResponseMessage, InboundMessage, MeshMessage, PublishOptions};

/// What the agent did with one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The topic is not an action request; nothing was done.
    Ignored,
    /// The payload was not a valid action request.
    Malformed,
    /// The request named a different agent.
    NotAddressed,
    /// No registered action has the requested name.
    UnknownAction,
    /// The action exists but currently refuses dispatch.
    NotInvocable,
    /// A response (success or contained failure) was published.
    Responded,
    /// The handler ran but the transport refused the response.
    PublishFailed,
}

impl DispatchOutcome {
    /// Returns `true` if the handler ran for this message.
    #[must_use]
    pub const fn invoked(self) -> bool {
        matches!(self, Self::Responded | Self::PublishFailed)
    }
}

impl AgentInner {
    /// Subscribes to this agent's action requests and spawns the listener loop.
    pub(crate) async fn start_listening(
        self: &Arc<Self>,
        inbound: InboundReceiver,
    ) -> Result<(), AgentError> {
        let topic = self.topics.action_request_subscription();
        self.transport
            .subscribe(&topic)
            .await
            .map_err(|source| AgentError::Subscribe {
                topic: topic.clone(),
                source,
            })?;
        info!("Listening for messages on {}", topic);

        let handle = tokio::spawn(listen(
            Arc::downgrade(self),
            inbound,
            self.cancellation_token.clone(),
            self.invocation_limit.clone(),
            self.tracker.clone(),
        ));
        let previous = self.listener.lock().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    /// Routes one inbound message to its action and publishes the response.
    #[instrument(skip_all, fields(topic = %message.topic))]
    pub(crate) async fn handle_message(&self, message: InboundMessage) -> DispatchOutcome {
        trace!("Received message: {}", message.payload);
        if !is_action_request(&message.topic) {
            trace!("Not an action request, ignoring");
            return DispatchOutcome::Ignored;
        }
        self.stats.record_received();

        let request = match MeshMessage::decode(&message.topic, &message.payload) {
            Ok(MeshMessage::ActionRequest(request)) => request,
            Ok(other) => {
                warn!("Unexpected message kind on an action-request topic: {:?}", other);
                self.stats.record_dropped();
                return DispatchOutcome::Malformed;
            }
            Err(e) => {
                error!("Failed to parse action request: {}", e);
                self.stats.record_dropped();
                return DispatchOutcome::Malformed;
            }
        };

        if request.agent_name != self.config.agent.name {
            warn!(
                "Agent {} is not registered with this agent ({})",
                request.agent_name, self.config.agent.name
            );
            self.stats.record_dropped();
            return DispatchOutcome::NotAddressed;
        }

        let Some(action) = self.find_action(&request.action_name) else {
            warn!("Action {} not found", request.action_name);
            self.stats.record_dropped();
            return DispatchOutcome::UnknownAction;
        };
        if !action.is_invocable() {
            warn!("Action {} is not invocable", request.action_name);
            self.stats.record_dropped();
            return DispatchOutcome::NotInvocable;
        }

        let meta = ActionMeta::new(message.session_id());
        let response = self.invoke_contained(&action, request.params(), meta).await;
        let body = ActionResponseMessage::for_request(&request, response);
        let topic = self.topics.action_response(&request.action_name);

        let payload = match serde_json::to_string(&body) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize response for {}: {}", request.action_name, e);
                self.stats.record_publish_failure();
                return DispatchOutcome::PublishFailed;
            }
        };

        let options = PublishOptions::with_user_properties(message.user_properties);
        match self.transport.publish(&topic, payload, options).await {
            Ok(()) => {
                debug!("Published response for {}", request.action_name);
                self.stats.record_response();
                DispatchOutcome::Responded
            }
            Err(e) => {
                error!("Failed to publish response for {}: {}", request.action_name, e);
                self.stats.record_publish_failure();
                DispatchOutcome::PublishFailed
            }
        }
    }

    /// Runs the handler, turning an error or a panic into an error response.
    async fn invoke_contained(
        &self,
        action: &Action,
        params: ActionParams,
        meta: ActionMeta,
    ) -> ActionResponse {
        let reason = match AssertUnwindSafe(action.invoke(params, meta))
            .catch_unwind()
            .await
        {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
        };

        error!("Action {} failed: {}", action.name(), reason);
        self.stats.record_handler_failure();
        ActionResponse::error(format!("Action {} failed: {}", action.name(), reason), reason)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}

/// Drains the inbound channel, spawning one tracked dispatch task per message.
///
/// With an invocation limit, the loop waits for a permit before taking the next
/// message off the channel, so a saturated agent applies backpressure instead
/// of spawning unbounded work.
async fn listen(
    agent: Weak<AgentInner>,
    mut inbound: InboundReceiver,
    cancel_token: CancellationToken,
    invocation_limit: Option<Arc<Semaphore>>,
    tracker: TaskTracker,
) {
    loop {
        let permit = match &invocation_limit {
            Some(semaphore) => {
                tokio::select! {
                    biased;

                    () = cancel_token.cancelled() => break,

                    permit = Arc::clone(semaphore).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                }
            }
            None => None,
        };

        let message = tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                trace!("Listener received shutdown signal");
                break;
            }

            message = inbound.recv() => match message {
                Some(message) => message,
                None => {
                    debug!("Inbound channel closed");
                    break;
                }
            },
        };

        let Some(agent) = agent.upgrade() else {
            trace!("Agent dropped, listener exiting");
            break;
        };
        tracker.spawn(async move {
            agent.handle_message(message).await;
            drop(permit);
        });
    }
    debug!("Listener finished");
}
