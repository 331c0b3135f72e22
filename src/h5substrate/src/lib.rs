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

//! Thin facade over the message-passing substrate.
//!
//! Nothing outside this crate is allowed to ask "is MPI present?" directly;
//! every other crate takes an `Arc<dyn Substrate>` and calls `rank()`,
//! `size()`, or one of the collectives. When no substrate is available (the
//! `mpi` feature is off, or initialization failed) [`StubSubstrate`] reports
//! rank 0 of size 1 and every collective is the identity, so a
//! single-process run behaves exactly like a one-rank MPI job.

#[cfg(feature = "mpi")]
mod mpi_backend;

use std::sync::{Arc, OnceLock};

/// Rank/size identity plus the handful of collectives the rest of the
/// engine needs: a barrier, a byte broadcast, and integer all-reduces.
pub trait Substrate: Send + Sync {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn has_parallel(&self) -> bool;

    fn barrier(&self);

    /// Broadcasts `value` from `root` to every rank. Non-root ranks' input
    /// is ignored; all ranks return the root's bytes.
    fn broadcast_bytes(&self, value: Vec<u8>, root: usize) -> Vec<u8>;

    fn allreduce_sum(&self, value: i64) -> i64;
    fn allreduce_min(&self, value: i64) -> i64;
    fn allreduce_max(&self, value: i64) -> i64;

    /// `true` iff every rank passed `true` — used by the manager to detect
    /// the loop's simultaneous-EMPTY termination condition.
    fn allreduce_and(&self, value: bool) -> bool {
        self.allreduce_min(i64::from(value)) != 0
    }

    /// `true` iff at least one rank passed `true`.
    fn allreduce_or(&self, value: bool) -> bool {
        self.allreduce_max(i64::from(value)) != 0
    }

    fn broadcast_u64(&self, value: u64, root: usize) -> u64 {
        let bytes = self.broadcast_bytes(value.to_le_bytes().to_vec(), root);
        u64::from_le_bytes(bytes.try_into().expect("broadcast preserves 8-byte payload"))
    }
}

/// Single-rank stand-in used when no message-passing substrate is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSubstrate;

impl Substrate for StubSubstrate {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn has_parallel(&self) -> bool {
        false
    }

    fn barrier(&self) {}

    fn broadcast_bytes(&self, value: Vec<u8>, _root: usize) -> Vec<u8> {
        value
    }

    fn allreduce_sum(&self, value: i64) -> i64 {
        value
    }

    fn allreduce_min(&self, value: i64) -> i64 {
        value
    }

    fn allreduce_max(&self, value: i64) -> i64 {
        value
    }
}

static SUBSTRATE: OnceLock<Arc<dyn Substrate>> = OnceLock::new();

/// Initializes the process-wide substrate handle. Idempotent: later calls
/// are ignored and the first-installed substrate keeps serving `global()`.
///
/// With the `mpi` feature enabled this attempts to join the MPI universe
/// and falls back to [`StubSubstrate`] if `MPI_Init` is not possible (e.g.
/// the binary was not launched under `mpirun`), logging the downgrade.
pub fn init() -> Arc<dyn Substrate> {
    SUBSTRATE
        .get_or_init(|| {
            #[cfg(feature = "mpi")]
            {
                if let Some(backend) = mpi_backend::MpiSubstrate::try_init() {
                    tracing::info!(rank = backend.rank(), size = backend.size(), "mpi substrate initialized");
                    return Arc::new(backend);
                }
                tracing::warn!("mpi feature enabled but no MPI universe available, falling back to single rank");
            }
            Arc::new(StubSubstrate)
        })
        .clone()
}

/// Returns the process-wide substrate, initializing the stub if [`init`]
/// was never called (useful for tests and single-binary tools that never
/// need MPI).
pub fn global() -> Arc<dyn Substrate> {
    SUBSTRATE.get().cloned().unwrap_or_else(|| init())
}
