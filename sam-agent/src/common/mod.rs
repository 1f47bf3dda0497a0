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

//! Configuration, errors, logging, topics and shared type aliases.
//!
//! Everything here is independent of a particular agent instance and is
//! re-exported from the crate root and the prelude.

pub use error::{AgentError, ConfigError, DecodeError, TransportError};
pub use types::*;

/// Agent configuration loaded from TOML.
pub mod config;
/// Error enums for every fallible surface of the crate.
mod error;
/// Global tracing subscriber setup.
pub mod logging;
/// Topic naming and wildcard matching.
pub mod topics;
/// Shared type aliases.
mod types;
