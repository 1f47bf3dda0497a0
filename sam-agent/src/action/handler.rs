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
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use tracing::{debug, instrument};

use crate::action::{ActionConfig, ActionDetails, ActionMeta, ActionResponse, ActionSummary};
use crate::common::ActionParams;

/// Boxed future returned by an action handler.
pub type ActionFuture = BoxFuture<'static, anyhow::Result<ActionResponse>>;

/// Type-erased action handler.
pub type ActionHandler = dyn Fn(ActionParams, ActionMeta) -> ActionFuture + Send + Sync + 'static;

/// A named unit of work an agent exposes on the mesh.
///
/// Wraps an [`ActionConfig`] and an async handler. The discovery and dispatch
/// flags start out from the config and can be flipped at runtime through a shared
/// `Arc<Action>`; the agent's next heartbeat and next request observe the change.
pub struct Action {
    config: ActionConfig,
    disabled: AtomicBool,
    invocable: AtomicBool,
    handler: Box<ActionHandler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.config.name)
            .field("disabled", &self.is_disabled())
            .field("invocable", &self.is_invocable())
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Creates an action from its description and handler.
    ///
    /// ```rust,ignore
    /// let echo = Action::new(
    ///     ActionConfig::new("echo", "Echo the text back").with_param("text", "Text to echo"),
    ///     |params, _meta| async move {
    ///         let text = params.get("text").and_then(|v| v.as_str()).unwrap_or_default();
    ///         Ok(ActionResponse::new(text))
    ///     },
    /// );
    /// ```
    pub fn new<F, Fut>(config: ActionConfig, handler: F) -> Self
    where
        F: Fn(ActionParams, ActionMeta) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ActionResponse>> + Send + 'static,
    {
        Self {
            disabled: AtomicBool::new(config.disabled),
            invocable: AtomicBool::new(config.invocable),
            config,
            handler: Box::new(move |params, meta| Box::pin(handler(params, meta))),
        }
    }

    /// The action's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The description the action was created with.
    #[must_use]
    pub const fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns. Failures are not contained here.
    #[instrument(skip(self, params, meta), fields(action = %self.config.name))]
    pub async fn invoke(
        &self,
        params: ActionParams,
        meta: ActionMeta,
    ) -> anyhow::Result<ActionResponse> {
        debug!(?params, session_id = %meta.session_id, "Invoking action");
        (self.handler)(params, meta).await
    }

    /// The discovery entry for this action, or `None` while it is disabled.
    #[must_use]
    pub fn info(&self) -> Option<ActionSummary> {
        if self.is_disabled() {
            return None;
        }
        Some(ActionSummary {
            name: self.config.name.clone(),
            details: ActionDetails {
                desc: self.config.description.clone(),
                params: self.config.params.iter().map(|p| p.render()).collect(),
                examples: self.config.examples.clone(),
                required_scopes: self.config.required_scopes.clone(),
            },
        })
    }

    /// Hides or restores the action in the registration summary.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Release);
    }

    /// Returns `true` while the action is hidden from discovery.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Allows or refuses dispatch of requests to this action.
    pub fn set_invocable(&self, invocable: bool) {
        self.invocable.store(invocable, Ordering::Release);
    }

    /// Returns `true` while requests for this action are dispatched.
    #[must_use]
    pub fn is_invocable(&self) -> bool {
        self.invocable.load(Ordering::Acquire)
    }
}
