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

//! Actions: named, described, invocable units of work.
//!
//! An [`Action`] pairs an [`ActionConfig`] (what discovery advertises) with an
//! async handler (what a request runs). Handlers receive the request's
//! [`ActionParams`](crate::common::ActionParams) and an [`ActionMeta`] and return
//! an [`ActionResponse`].

pub use config::{ActionConfig, ActionParam};
pub use handler::{Action, ActionFuture, ActionHandler};
pub use response::{ActionMeta, ActionResponse};
pub use summary::{ActionDetails, ActionSummary};

mod config;
mod handler;
mod response;
mod summary;
