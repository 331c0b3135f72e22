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

use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::{Communicator, SimpleCommunicator};
use mpi::traits::*;

use crate::Substrate;

/// Wraps a `rsmpi` world communicator. Holding onto `Universe` keeps MPI
/// initialized for the process lifetime; dropping it would call
/// `MPI_Finalize`.
pub struct MpiSubstrate {
    _universe: Universe,
    world: SimpleCommunicator,
}

impl MpiSubstrate {
    /// Attempts `MPI_Init`. Returns `None` when the process was not
    /// launched under an MPI runtime, so callers can fall back to the
    /// single-rank stub instead of panicking.
    pub fn try_init() -> Option<Self> {
        let universe = mpi::initialize()?;
        let world = universe.world();
        Some(Self {
            _universe: universe,
            world,
        })
    }

    pub(crate) fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    pub(crate) fn size(&self) -> usize {
        self.world.size() as usize
    }
}

impl Substrate for MpiSubstrate {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn has_parallel(&self) -> bool {
        true
    }

    fn barrier(&self) {
        self.world.barrier();
    }

    fn broadcast_bytes(&self, mut value: Vec<u8>, root: usize) -> Vec<u8> {
        let root_process = self.world.process_at_rank(root as i32);

        let mut len = if self.rank() == root {
            value.len() as u64
        } else {
            0
        };
        root_process.broadcast_into(&mut len);

        value.resize(len as usize, 0);
        root_process.broadcast_into(&mut value[..]);
        value
    }

    fn allreduce_sum(&self, value: i64) -> i64 {
        let mut result = 0i64;
        self.world
            .all_reduce_into(&value, &mut result, SystemOperation::sum());
        result
    }

    fn allreduce_min(&self, value: i64) -> i64 {
        let mut result = 0i64;
        self.world
            .all_reduce_into(&value, &mut result, SystemOperation::min());
        result
    }

    fn allreduce_max(&self, value: i64) -> i64 {
        let mut result = 0i64;
        self.world
            .all_reduce_into(&value, &mut result, SystemOperation::max());
        result
    }
}
