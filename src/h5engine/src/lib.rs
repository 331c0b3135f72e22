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

//! The generator/stage/resource lifecycle and the top-level workflow
//! orchestrator.

pub mod cache;
pub mod error;
pub mod generator;
pub mod manager;
pub mod resource;
pub mod stage;

pub use cache::Cache;
pub use error::{Error, Result};
pub use generator::{Generator, LoopGenerator};
pub use manager::{CacheBuilder, RunState, WorkflowManager};
pub use resource::{Resource, ResourceRegistry};
pub use stage::{RequiredDataset, Stage};
