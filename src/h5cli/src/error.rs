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

//! Maps every lower-layer error to one of the three non-zero exit codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] h5flow_config::Error),

    #[error(transparent)]
    Storage(#[from] h5flow_storage::Error),

    #[error(transparent)]
    Engine(#[from] h5flow_engine::Error),

    #[error("failed to prepare the output file at {path}")]
    PrepareOutput {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// 1: configuration/discovery, 2: I/O, 3: workflow-runtime.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => 1,
            CliError::PrepareOutput { .. } => 2,
            CliError::Storage(h5flow_storage::Error::Io(_)) => 2,
            CliError::Storage(_) => 3,
            CliError::Engine(_) => 3,
        }
    }
}
