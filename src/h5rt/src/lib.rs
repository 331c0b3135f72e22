// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging bootstrap for `h5flow` binaries: a `tracing`/`tracing-subscriber`
//! logger whose verbosity is driven by the CLI's repeated `-v` flag.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::filter::{self, LevelFilter};
use tracing_subscriber::prelude::*;

/// Controls the logger's verbosity and output shape. Built from the CLI's
/// `-v`/`-vv` flag count: 0 is `WARN`, 1 is `INFO`, 2+ is `DEBUG` for this
/// crate family; third-party crates stay at `WARN` regardless.
pub struct LoggerSettings {
    own_level: Level,
    colorful: bool,
}

impl LoggerSettings {
    pub fn new_default() -> Self {
        Self::from_verbosity(0)
    }

    /// `verbosity` is the number of `-v` flags passed on the command line.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let own_level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        };
        Self {
            own_level,
            colorful: std::io::stderr().is_terminal(),
        }
    }
}

#[cfg(test)]
impl LoggerSettings {
    fn own_level(&self) -> Level {
        self.own_level
    }
}

/// Initializes the global `tracing` subscriber. Idempotent across repeated
/// calls within a process only insofar as `tracing`'s own global-default
/// guard allows; `h5flow-cli`'s `main` calls this exactly once.
pub fn init_logger(settings: LoggerSettings) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(settings.colorful)
        .with_writer(std::io::stderr);

    let targets = filter::Targets::new()
        .with_target("h5flow_storage", settings.own_level)
        .with_target("h5flow_substrate", settings.own_level)
        .with_target("h5flow_engine", settings.own_level)
        .with_target("h5flow_config", settings.own_level)
        .with_target("h5flow_modules", settings.own_level)
        .with_target("h5flow_cli", settings.own_level)
        .with_default(LevelFilter::WARN);

    let subscriber = tracing_subscriber::registry().with(fmt_layer.with_filter(targets));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("global tracing subscriber was already set; skipping re-init");
    }
}

/// Aborts the process on panic instead of unwinding, so a panic in a
/// worker rank cannot leave the collective substrate half-way through a
/// barrier. Extends the run's termination-by-abort story to Rust panics,
/// not just `Result` errors.
pub fn set_panic_abort() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        std::process::abort();
    }));
}
