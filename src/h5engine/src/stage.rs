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

//! The stage contract: base interface for user processors, instantiated
//! once per rank in configuration order.

use std::ops::Range;

use crate::cache::Cache;
use crate::error::Result;

/// One configured `requires` entry, as named by a stage's `<name>.requires`
/// block in the workflow config.
#[derive(Clone, Debug)]
pub enum RequiredDataset {
    /// A single-hop join `source → path`.
    Path(String),
    /// A multi-hop chain of joins.
    Chain(Vec<String>),
    /// An explicit `{name, path, index_only?}` block.
    Keyed { name: String, path: String, index_only: bool },
}

impl RequiredDataset {
    /// The cache key this requirement is preloaded under.
    pub fn cache_name(&self) -> String {
        match self {
            RequiredDataset::Path(path) => path.clone(),
            RequiredDataset::Chain(hops) => hops.join("->"),
            RequiredDataset::Keyed { name, .. } => name.clone(),
        }
    }

    pub fn index_only(&self) -> bool {
        matches!(self, RequiredDataset::Keyed { index_only: true, .. })
    }
}

/// Base contract for a user processor. Stages receive the data manager by
/// injection at construction time (resolved by the module binder), not
/// through this trait, since the manager's row types vary per stage.
pub trait Stage: Send {
    fn init(&mut self, source_name: &str) -> Result<()>;

    /// Runs this stage over `source_slice`. `cache` holds this stage's
    /// (and every other configured stage's) declared `requires` entries,
    /// pre-materialized for `source_slice`; the stage may evict an entry
    /// to force rematerialization before a later stage reads it.
    fn run(&mut self, source_name: &str, source_slice: Range<u64>, cache: &mut Cache) -> Result<()>;

    fn finish(&mut self, source_name: &str) -> Result<()>;

    /// The joins this stage needs preloaded into the cache for every
    /// iteration. Empty by default.
    fn requires(&self) -> &[RequiredDataset] {
        &[]
    }
}
