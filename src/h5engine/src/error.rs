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

/// Engine-layer error taxonomy.
#[derive(Error, Debug)]
pub enum Error {
    /// Propagated unchanged from user stage code.
    #[error(transparent)]
    Stage(#[from] anyhow::Error),

    #[error("a rank reached EMPTY but a collective was initiated expecting rows")]
    Termination,

    #[error("cache entry {name} was never registered for this iteration")]
    UnknownCacheEntry { name: String },

    #[error("cache entry {name} was materialized as a different row type than requested")]
    CacheTypeMismatch { name: String },

    #[error("resource classname {classname} was not initialized before lookup")]
    UnknownResource { classname: String },

    #[error(transparent)]
    Storage(#[from] h5flow_storage::Error),
}
