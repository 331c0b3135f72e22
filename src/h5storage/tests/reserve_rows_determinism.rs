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

//! Two ranks sharing one container each reserve rows and land at
//! disjoint, rank-ordered offsets.

use std::sync::{Arc, Barrier, Mutex};

use h5flow_storage::container::MemoryContainer;
use h5flow_storage::path::data_path;
use h5flow_storage::{Container, DataManager};
use h5flow_substrate::Substrate;

/// Two-rank test double: `broadcast_bytes` blocks until both ranks have
/// posted a value for the current generation, then every caller reads the
/// root's value back out. `rank()`'s caller decides which virtual rank it
/// plays.
struct TwoRankSubstrate {
    rank: usize,
    slots: Arc<Mutex<Vec<Option<Vec<u8>>>>>,
    entry_barrier: Arc<Barrier>,
    exit_barrier: Arc<Barrier>,
}

impl Substrate for TwoRankSubstrate {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        2
    }

    fn has_parallel(&self) -> bool {
        true
    }

    fn barrier(&self) {
        self.entry_barrier.wait();
    }

    fn broadcast_bytes(&self, value: Vec<u8>, root: usize) -> Vec<u8> {
        if self.rank == root {
            self.slots.lock().unwrap()[root] = Some(value);
        }
        self.entry_barrier.wait();
        let out = self.slots.lock().unwrap()[root].clone().unwrap();
        self.exit_barrier.wait();
        if self.rank == root {
            self.slots.lock().unwrap()[root] = None;
        }
        out
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

#[test]
fn scenario_d_two_rank_append_lands_at_disjoint_offsets() {
    let container = MemoryContainer::new();
    container.create_dataset::<i64>(&data_path("/A"), 16).unwrap();

    let slots = Arc::new(Mutex::new(vec![None, None]));
    let entry_barrier = Arc::new(Barrier::new(2));
    let exit_barrier = Arc::new(Barrier::new(2));

    let spawn = |rank: usize, container: MemoryContainer| {
        let substrate: Arc<dyn Substrate> = Arc::new(TwoRankSubstrate {
            rank,
            slots: slots.clone(),
            entry_barrier: entry_barrier.clone(),
            exit_barrier: exit_barrier.clone(),
        });
        std::thread::spawn(move || {
            let mgr = DataManager::new(container, substrate);
            let offset = mgr.reserve_rows::<i64>("/A", 5).unwrap();
            let rows: Vec<i64> = (0..5).map(|i| (rank * 100 + i) as i64).collect();
            mgr.write_data("/A", offset, &rows).unwrap();
            offset
        })
    };

    let h0 = spawn(0, container.clone());
    let h1 = spawn(1, container.clone());
    let offset0 = h0.join().unwrap();
    let offset1 = h1.join().unwrap();

    assert_eq!(offset0, 0);
    assert_eq!(offset1, 5);
    assert_eq!(container.dataset_len(&data_path("/A")).unwrap(), Some(10));

    let row7: Vec<i64> = container.read_slice(&data_path("/A"), 7, 1).unwrap();
    assert_eq!(row7, vec![102]);
}
