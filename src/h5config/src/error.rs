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

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration-layer error taxonomy. Raised before any file write,
/// causing exit code 1 at the CLI boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown classname {classname} (searched own crate, modules path-deps, then built-ins)")]
    UnknownClassname { classname: String },

    #[error("block {block} is missing required key {key}")]
    MissingRequiredKey { block: String, key: String },

    #[error("!include cycle detected: {0:?}")]
    InclusionLoop(Vec<PathBuf>),

    #[error("failed to read configuration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration as YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Factory(#[from] anyhow::Error),
}
