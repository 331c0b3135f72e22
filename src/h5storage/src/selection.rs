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

/// A normalized selection over the source side of a reference table: a
/// contiguous range or an arbitrary index array both collapse to this
/// before dereferencing.
#[derive(Clone, Debug)]
pub struct Selection(pub Vec<i64>);

impl Selection {
    pub fn range(start: u64, stop: u64) -> Self {
        Self((start as i64..stop as i64).collect())
    }

    pub fn from_indices(indices: Vec<i64>) -> Self {
        Self(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
