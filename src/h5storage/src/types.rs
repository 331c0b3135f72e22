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

/// One row of a shared `ref` table: `(parent_row, child_row)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, hdf5::H5Type)]
#[repr(C)]
pub struct RefPair {
    pub parent: i64,
    pub child: i64,
}

/// One row of a `ref_region` index: the half-open `[start, stop)` window
/// into the shared `ref` table for a single parent row. `start == stop ==
/// 0` encodes "no references".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, hdf5::H5Type)]
#[repr(C)]
pub struct RefRegion {
    pub start: i64,
    pub stop: i64,
}

impl RefRegion {
    pub const NULL: RefRegion = RefRegion { start: 0, stop: 0 };

    pub fn is_null(&self) -> bool {
        self.start == 0 && self.stop == 0
    }

    /// Widens `self` to cover `[touched_start, touched_stop)` as well,
    /// per the "widen to union" rule. Commutative and associative, so any
    /// interleaving of concurrent widenings by different ranks converges
    /// to the same result.
    pub fn widen(self, touched_start: i64, touched_stop: i64) -> RefRegion {
        if self.is_null() {
            RefRegion {
                start: touched_start,
                stop: touched_stop,
            }
        } else {
            RefRegion {
                start: self.start.min(touched_start),
                stop: self.stop.max(touched_stop),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_null_region_adopts_the_touched_window() {
        let r = RefRegion::NULL.widen(3, 5);
        assert_eq!(r, RefRegion { start: 3, stop: 5 });
    }

    #[test]
    fn widening_existing_region_takes_min_start_max_stop() {
        let r = RefRegion { start: 2, stop: 4 }.widen(0, 3);
        assert_eq!(r, RefRegion { start: 0, stop: 4 });
        let r = RefRegion { start: 2, stop: 4 }.widen(5, 8);
        assert_eq!(r, RefRegion { start: 2, stop: 8 });
    }

    #[test]
    fn widen_is_commutative_across_interleavings() {
        let a = RefRegion::NULL.widen(4, 6).widen(1, 2);
        let b = RefRegion::NULL.widen(1, 2).widen(4, 6);
        assert_eq!(a, b);
    }
}
