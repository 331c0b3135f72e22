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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Storage-layer error taxonomy.
#[derive(Error, Debug)]
pub enum Error {
    #[error("dataset {path} already exists with a different element type")]
    AlreadyExistsWithDifferentType { path: String },

    #[error("no space left to extend dataset {path} by {requested} rows")]
    OutOfSpace { path: String, requested: u64 },

    #[error("container I/O error")]
    Io(#[from] hdf5::Error),

    #[error("selector {index} is out of range for population of size {population}")]
    InvalidSelection { index: i64, population: u64 },

    #[error("region index has length {region_len}, expected {expected} (one per row of the source-side group)")]
    ShapeMismatch { region_len: u64, expected: u64 },

    #[error("reference table at {path} is not a two-column integer table")]
    TypeMismatch { path: String },

    #[error("dataset {path} not found")]
    NotFound { path: String },
}
