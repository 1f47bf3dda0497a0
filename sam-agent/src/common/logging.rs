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

//! Process-wide tracing setup for agent binaries.

use anyhow::anyhow;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::common::config::TracingConfig;

/// Installs the global tracing subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over [`TracingConfig::filter`]. When
/// [`TracingConfig::log_directory`] is set, output goes to a daily rolling file
/// through a non-blocking writer and the returned guard must be kept alive for
/// the lifetime of the process; otherwise output goes to stdout and `None` is
/// returned.
///
/// # Errors
///
/// Fails if the filter directive is invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    if let Some(directory) = &config.log_directory {
        std::fs::create_dir_all(directory)?;
        let appender = RollingFileAppender::new(Rotation::DAILY, directory, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .try_init()
            .map_err(|e| anyhow!(e))?;
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| anyhow!(e))?;
        Ok(None)
    }
}
