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
#![forbid(unsafe_code)]

//! Testing utilities for `sam-agent`.
//!
//! Provides the [`sam_test`](prelude::sam_test) attribute for async integration tests and a
//! once-only tracing subscriber so agent logs show up next to failing assertions.

use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Commonly used items for tests.
pub mod prelude {
    pub use sam_test_macro::sam_test;

    pub use crate::initialize_tracing;
}

#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}

static INIT: Once = Once::new();

/// Installs a global compact subscriber for test output, at most once per test binary.
///
/// The filter defaults to `sam_agent=debug` and honours `RUST_LOG` when set.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,sam_agent=debug"));

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        // Another harness may already own the global subscriber.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
