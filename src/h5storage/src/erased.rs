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

//! An object-safe facade over [`DataManager`], for callers (module
//! registry factories, resolved by classname rather than by generic
//! parameter) that cannot themselves be generic over `C: Container`. Same
//! family of type-erasure as [`crate::container::MemoryContainer`]'s
//! internal `Box<dyn Any>` entries, pushed up one layer.

use std::sync::Arc;

use crate::container::Container;
use crate::error::Result;
use crate::manager::DataManager;

/// Covers the two row shapes built-in modules are written against
/// (`f64` measurement columns, `i64` index/id columns). A stage needing a
/// different row type links `h5flow_storage` directly and takes a
/// generic `DataManager<C>` instead of this facade.
pub trait ErasedDataManager: Send + Sync {
    fn create_dataset_f64(&self, group: &str) -> Result<()>;
    fn reserve_rows_f64(&self, group: &str, local_count: u64) -> Result<u64>;
    fn write_data_f64(&self, group: &str, offset: u64, rows: &[f64]) -> Result<()>;
    fn create_dataset_i64(&self, group: &str) -> Result<()>;
    fn reserve_rows_i64(&self, group: &str, local_count: u64) -> Result<u64>;
    fn write_data_i64(&self, group: &str, offset: u64, rows: &[i64]) -> Result<()>;
}

impl<C: Container + Send + Sync> ErasedDataManager for DataManager<C> {
    fn create_dataset_f64(&self, group: &str) -> Result<()> {
        self.create_dataset::<f64>(group)
    }

    fn reserve_rows_f64(&self, group: &str, local_count: u64) -> Result<u64> {
        self.reserve_rows::<f64>(group, local_count)
    }

    fn write_data_f64(&self, group: &str, offset: u64, rows: &[f64]) -> Result<()> {
        self.write_data(group, offset, rows)
    }

    fn create_dataset_i64(&self, group: &str) -> Result<()> {
        self.create_dataset::<i64>(group)
    }

    fn reserve_rows_i64(&self, group: &str, local_count: u64) -> Result<u64> {
        self.reserve_rows::<i64>(group, local_count)
    }

    fn write_data_i64(&self, group: &str, offset: u64, rows: &[i64]) -> Result<()> {
        self.write_data(group, offset, rows)
    }
}

/// Shorthand for the handle module factories are given: shared, since the
/// same data manager is reused across every generator/stage/resource a
/// single workflow constructs.
pub type SharedDataManager = Arc<dyn ErasedDataManager>;
