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

//! Collective row reservation and chunk-aligned writes.
//!
//! Every write to a group's `data` array, and every update of a `ref`/
//! `ref_region` pair, goes through a [`DataManager`] so that concurrent
//! ranks never race on the same dataset extension.

use std::collections::HashMap;
use std::sync::Arc;

use h5flow_substrate::Substrate;

use crate::container::{Container, Row};
use crate::error::Result;
use crate::path::{data_path, ref_path, ref_region_path};
use crate::types::{RefPair, RefRegion};

const DEFAULT_CHUNK: u64 = 1024;

/// Drives one container file on behalf of every rank sharing it. Holds no
/// rank-local buffering: each call commits directly to the container,
/// so every rank's view of a finished group is identical once the run
/// closes.
pub struct DataManager<C: Container> {
    container: C,
    substrate: Arc<dyn Substrate>,
}

impl<C: Container> DataManager<C> {
    pub fn new(container: C, substrate: Arc<dyn Substrate>) -> Self {
        Self { container, substrate }
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn create_dataset<T: Row>(&self, group: &str) -> Result<()> {
        self.container.create_dataset::<T>(&data_path(group), DEFAULT_CHUNK)
    }

    /// Collectively reserves `local_count` rows for the calling rank in
    /// `group`'s `data` array and returns this rank's exclusive starting
    /// offset. Every rank must call this for every group on every loop
    /// iteration, even with `local_count == 0`, so the exclusive prefix sum
    /// stays aligned across ranks. Callers reserve explicitly rather than
    /// relying on an implicit first-write reservation.
    ///
    /// Implemented as `size()` sequential single-value broadcasts rather
    /// than a dedicated exclusive-scan collective, since [`Substrate`] does
    /// not expose one. TODO: add an `Exscan` primitive to `Substrate` so
    /// this is a single collective instead of O(size) broadcasts.
    pub fn reserve_rows<T: Row>(&self, group: &str, local_count: u64) -> Result<u64> {
        let path = data_path(group);
        let base = self.container.dataset_len(&path)?.unwrap_or(0);

        let my_rank = self.substrate.rank();
        let mut offset = base;
        let mut running = base;
        for root in 0..self.substrate.size() {
            let count_at_root = if root == my_rank { local_count } else { 0 };
            let broadcasted = self.substrate.broadcast_u64(count_at_root, root);
            if root == my_rank {
                offset = running;
            }
            running += broadcasted;
        }

        self.container.extend_dataset::<T>(&path, running)?;
        self.substrate.barrier();
        Ok(offset)
    }

    /// Writes `rows` at `start`, the offset returned by a prior
    /// [`reserve_rows`](Self::reserve_rows) call. Callers must reserve
    /// before writing; this never extends the dataset itself — there is no
    /// implicit reserve-on-first-write.
    pub fn write_data<T: Row>(&self, group: &str, start: u64, rows: &[T]) -> Result<()> {
        self.container.write_slice(&data_path(group), start, rows)
    }

    /// Appends `pairs` to the shared `ref` table for `(parent, child)` and
    /// widens both the parent-side (`parent/ref/child/ref_region`) and
    /// child-side (`child/ref/parent/ref_region`) windows to cover every
    /// row `pairs` touches, applying the commutative "widen to union" rule
    /// so concurrent writers converge regardless of interleaving. `pairs`
    /// may span any number of distinct parent rows in one call; every row
    /// touched gets its own window widened, not just one.
    pub fn write_ref(&self, parent: &str, child: &str, pairs: &[RefPair]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let ref_p = ref_path(parent, child);
        let parent_region_p = ref_region_path(parent, child);
        let child_region_p = ref_region_path(child, parent);

        self.container.create_dataset::<RefPair>(&ref_p, DEFAULT_CHUNK)?;
        self.container
            .create_dataset::<RefRegion>(&parent_region_p, DEFAULT_CHUNK)?;
        self.container
            .create_dataset::<RefRegion>(&child_region_p, DEFAULT_CHUNK)?;

        let base = self.container.dataset_len(&ref_p)?.unwrap_or(0);
        self.container.extend_dataset::<RefPair>(&ref_p, base + pairs.len() as u64)?;
        self.container.write_slice(&ref_p, base, pairs)?;

        let parent_touches = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| (p.parent as u64, base + i as u64));
        self.widen_region(&parent_region_p, parent_touches)?;

        let child_touches = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| (p.child as u64, base + i as u64));
        self.widen_region(&child_region_p, child_touches)
    }

    /// Widens `region_path[row]` to cover every `ref`-table position in
    /// `touches` belonging to that row, for every distinct `row` touched.
    fn widen_region(&self, region_path: &str, touches: impl Iterator<Item = (u64, u64)>) -> Result<()> {
        let mut spans: HashMap<u64, (i64, i64)> = HashMap::new();
        for (row, position) in touches {
            let span = spans.entry(row).or_insert((position as i64, position as i64 + 1));
            span.0 = span.0.min(position as i64);
            span.1 = span.1.max(position as i64 + 1);
        }

        let max_row = match spans.keys().copied().max() {
            Some(row) => row,
            None => return Ok(()),
        };
        let region_len = self.container.dataset_len(region_path)?.unwrap_or(0);
        if max_row >= region_len {
            self.container
                .extend_dataset::<RefRegion>(region_path, max_row + 1)?;
        }

        for (row, (touched_start, touched_stop)) in spans {
            let existing = self.container.read_one::<RefRegion>(region_path, row).unwrap_or(RefRegion::NULL);
            let widened = existing.widen(touched_start, touched_stop);
            self.container.write_slice(region_path, row, &[widened])?;
        }
        Ok(())
    }

    pub fn get_dset<T: Row>(&self, group: &str, start: u64, len: u64) -> Result<Vec<T>> {
        self.container.read_slice(&data_path(group), start, len)
    }

    pub fn get_ref(&self, parent: &str, child: &str, start: u64, len: u64) -> Result<Vec<RefPair>> {
        self.container.read_slice(&ref_path(parent, child), start, len)
    }

    pub fn get_ref_region(&self, parent: &str, child: &str, row: u64) -> Result<RefRegion> {
        self.container.read_one(&ref_region_path(parent, child), row)
    }

    pub fn delete(&self, group: &str) -> Result<()> {
        self.container.delete_group(group)
    }

    pub fn finish(&self) -> Result<()> {
        self.container.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryContainer;

    fn manager() -> DataManager<MemoryContainer> {
        DataManager::new(MemoryContainer::new(), Arc::new(h5flow_substrate::StubSubstrate))
    }

    #[test]
    fn reserve_rows_returns_contiguous_single_rank_offsets() {
        let mgr = manager();
        mgr.create_dataset::<i64>("/A").unwrap();
        let first = mgr.reserve_rows::<i64>("/A", 3).unwrap();
        let second = mgr.reserve_rows::<i64>("/A", 2).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 3);
    }

    #[test]
    fn write_ref_widens_region_across_two_batches() {
        let mgr = manager();
        let pairs_a = vec![RefPair { parent: 0, child: 10 }];
        mgr.write_ref("/A", "/B", &pairs_a).unwrap();
        let region = mgr.get_ref_region("/A", "/B", 0).unwrap();
        assert_eq!(region, RefRegion { start: 0, stop: 1 });

        let pairs_b = vec![RefPair { parent: 0, child: 11 }];
        mgr.write_ref("/A", "/B", &pairs_b).unwrap();
        let region = mgr.get_ref_region("/A", "/B", 0).unwrap();
        assert_eq!(region, RefRegion { start: 0, stop: 2 });

        let all = mgr.get_ref("/A", "/B", 0, 2).unwrap();
        assert_eq!(all, vec![RefPair { parent: 0, child: 10 }, RefPair { parent: 0, child: 11 }]);
    }

    #[test]
    fn write_ref_widens_every_distinct_parent_row_in_one_batch() {
        let mgr = manager();
        let pairs = vec![
            RefPair { parent: 0, child: 10 },
            RefPair { parent: 2, child: 11 },
            RefPair { parent: 0, child: 12 },
        ];
        mgr.write_ref("/A", "/B", &pairs).unwrap();

        let region_0 = mgr.get_ref_region("/A", "/B", 0).unwrap();
        assert_eq!(region_0, RefRegion { start: 0, stop: 3 });
        let region_2 = mgr.get_ref_region("/A", "/B", 2).unwrap();
        assert_eq!(region_2, RefRegion { start: 1, stop: 2 });
    }

    #[test]
    fn write_ref_also_widens_the_reciprocal_child_side_region() {
        let mgr = manager();
        let pairs = vec![RefPair { parent: 3, child: 7 }, RefPair { parent: 3, child: 9 }];
        mgr.write_ref("/A", "/B", &pairs).unwrap();

        let parent_side = mgr.get_ref_region("/A", "/B", 3).unwrap();
        assert_eq!(parent_side, RefRegion { start: 0, stop: 2 });

        let child_side_7 = mgr.get_ref_region("/B", "/A", 7).unwrap();
        assert_eq!(child_side_7, RefRegion { start: 0, stop: 1 });
        let child_side_9 = mgr.get_ref_region("/B", "/A", 9).unwrap();
        assert_eq!(child_side_9, RefRegion { start: 1, stop: 2 });
    }

    #[test]
    fn write_data_extends_and_reads_back() {
        let mgr = manager();
        mgr.create_dataset::<i64>("/A").unwrap();
        let off = mgr.reserve_rows::<i64>("/A", 2).unwrap();
        mgr.write_data("/A", off, &[7i64, 8]).unwrap();
        let rows: Vec<i64> = mgr.get_dset("/A", 0, 2).unwrap();
        assert_eq!(rows, vec![7, 8]);
    }
}
