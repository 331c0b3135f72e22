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

//! The container-file facade: every other module in this crate talks to
//! [`Container`], never to the `hdf5` crate directly, so the on-disk
//! format stays swappable and the data manager can be exercised
//! against [`MemoryContainer`] in tests without a real HDF5 library.

use std::path::Path;

use crate::error::{Error, Result};

/// Bound satisfied by every row type this crate stores: a structured or
/// scalar element with a stable HDF5 layout, cheap to clone, and with a
/// sensible zero value to extend a dataset into.
pub trait Row: hdf5::H5Type + Clone + Send + Sync + Default + 'static {}
impl<T: hdf5::H5Type + Clone + Send + Sync + Default + 'static> Row for T {}

/// Thin facade over the self-describing container file. All
/// paths are absolute group paths (`/A`); implementations derive the
/// concrete dataset location (`/A/data`, `/A/ref/B/ref`, ...) via
/// [`crate::path`].
pub trait Container: Sized {
    fn create(path: &Path) -> Result<Self>;
    fn open_rw(path: &Path) -> Result<Self>;

    /// `None` if the dataset does not exist yet.
    fn dataset_len(&self, dataset_path: &str) -> Result<Option<u64>>;

    /// Creates `dataset_path` as a chunked, extendible 1-D array of `T` if
    /// absent. Fails [`Error::AlreadyExistsWithDifferentType`] if it exists
    /// with an incompatible element type.
    fn create_dataset<T: Row>(&self, dataset_path: &str, chunk: u64) -> Result<()>;

    /// Extends `dataset_path` so its length becomes `new_len`, filling new
    /// rows with `T::default()`. A no-op if `new_len <= current length`.
    fn extend_dataset<T: Row>(&self, dataset_path: &str, new_len: u64) -> Result<()>;

    fn write_slice<T: Row>(&self, dataset_path: &str, start: u64, rows: &[T]) -> Result<()>;

    fn read_slice<T: Row>(&self, dataset_path: &str, start: u64, len: u64) -> Result<Vec<T>>;

    fn read_one<T: Row>(&self, dataset_path: &str, index: u64) -> Result<T> {
        Ok(self
            .read_slice::<T>(dataset_path, index, 1)?
            .into_iter()
            .next()
            .expect("read_slice(_, _, 1) returns exactly one row"))
    }

    fn delete_group(&self, group_path: &str) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

pub mod hdf5_backend;
pub mod memory;

pub use hdf5_backend::Hdf5Container;
pub use memory::MemoryContainer;

/// Helper shared by both backends: turns a missing dataset into `NotFound`.
pub(crate) fn require_len(found: Option<u64>, path: &str) -> Result<u64> {
    found.ok_or_else(|| Error::NotFound {
        path: path.to_string(),
    })
}
