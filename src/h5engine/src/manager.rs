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

//! The top-level orchestrator: drives init → run-loop → finish across
//! every component.

use std::sync::Arc;

use h5flow_substrate::Substrate;

use crate::cache::Cache;
use crate::error::Result;
use crate::generator::Generator;
use crate::resource::ResourceRegistry;
use crate::stage::Stage;

/// Per-rank lifecycle state. Any error in a state transition moves to
/// `Aborting`, then `Closed`, after a best-effort barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Created,
    Initialized,
    Running,
    Iterating,
    Drained,
    Finishing,
    Closed,
    Aborting,
}

/// Builds the cache for one iteration's `source_slice`, preloading every
/// configured stage's declared `requires` entries. Supplied by the binder
/// (`h5flow-config`), which knows the concrete row types behind each
/// requirement; the manager itself stays row-type-agnostic.
pub type CacheBuilder = Box<dyn FnMut(std::ops::Range<u64>) -> Result<Cache> + Send>;

/// Drives one workflow run on behalf of one rank. Generic only over the
/// substrate handle, since every other component is already boxed/erased
/// by the time the binder hands it to the manager.
pub struct WorkflowManager {
    substrate: Arc<dyn Substrate>,
    generator: Box<dyn Generator>,
    stages: Vec<(String, Box<dyn Stage>)>,
    resources: ResourceRegistry,
    source_name: String,
    build_cache: CacheBuilder,
    drop_list: Vec<String>,
    finish_file: Box<dyn FnMut(&[String]) -> Result<()> + Send>,
    state: RunState,
}

impl WorkflowManager {
    pub fn new(
        substrate: Arc<dyn Substrate>,
        source_name: impl Into<String>,
        generator: Box<dyn Generator>,
        stages: Vec<(String, Box<dyn Stage>)>,
        resources: ResourceRegistry,
        build_cache: CacheBuilder,
        drop_list: Vec<String>,
        finish_file: Box<dyn FnMut(&[String]) -> Result<()> + Send>,
    ) -> Self {
        Self {
            substrate,
            generator,
            stages,
            resources,
            source_name: source_name.into(),
            build_cache,
            drop_list,
            finish_file,
            state: RunState::Created,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Runs the full lifecycle: init, loop until every rank reports
    /// `EMPTY` in the same iteration, then finish.
    pub fn run(&mut self) -> Result<()> {
        match self.run_inner() {
            Ok(()) => Ok(()),
            Err(err) => {
                self.state = RunState::Aborting;
                self.substrate.barrier();
                self.state = RunState::Closed;
                Err(err)
            }
        }
    }

    fn run_inner(&mut self) -> Result<()> {
        self.generator.init()?;
        for (_, stage) in &mut self.stages {
            stage.init(&self.source_name)?;
        }
        self.state = RunState::Initialized;

        self.state = RunState::Running;
        loop {
            self.state = RunState::Iterating;
            let local_slice = self.generator.next()?;
            let all_empty = self.substrate.allreduce_and(local_slice.is_none());
            if all_empty {
                break;
            }

            if let Some(slice) = local_slice {
                let mut cache = (self.build_cache)(slice.clone())?;
                for (_, stage) in &mut self.stages {
                    stage.run(&self.source_name, slice.clone(), &mut cache)?;
                }
            }
            // A rank with no local work this iteration still reaches the
            // collective above with an empty slice, so ranks stay in lockstep
            // until the global terminator fires.
        }
        self.state = RunState::Drained;

        self.state = RunState::Finishing;
        self.generator.finish()?;
        for (_, stage) in &mut self.stages {
            stage.finish(&self.source_name)?;
        }
        (self.finish_file)(&self.drop_list)?;
        self.state = RunState::Closed;
        Ok(())
    }
}
