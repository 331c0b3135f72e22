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

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Container;
use crate::error::{Error, Result};

struct Entry {
    len: usize,
    data: Box<dyn Any + Send + Sync>,
}

/// In-process stand-in for [`Hdf5Container`](super::Hdf5Container), used
/// only by this crate's own test suite so the dereferencing engine and
/// data manager can be exercised without linking against libhdf5. Length is
/// tracked alongside the type-erased buffer since a generic
/// `dataset_len(&self, path)` cannot downcast without knowing `T`. The
/// backing map lives behind an `Arc`, so cloning a `MemoryContainer` hands
/// out another handle to the same in-memory file rather than a copy —
/// mirroring how two MPI ranks hold independent handles to one HDF5 file.
#[derive(Clone, Default)]
pub struct MemoryContainer {
    datasets: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Container for MemoryContainer {
    fn create(_path: &Path) -> Result<Self> {
        Ok(Self::new())
    }

    fn open_rw(_path: &Path) -> Result<Self> {
        Ok(Self::new())
    }

    fn dataset_len(&self, dataset_path: &str) -> Result<Option<u64>> {
        let guard = self.datasets.lock();
        Ok(guard.get(dataset_path).map(|e| e.len as u64))
    }

    fn create_dataset<T: super::Row>(&self, dataset_path: &str, _chunk: u64) -> Result<()> {
        let mut guard = self.datasets.lock();
        if let Some(existing) = guard.get(dataset_path) {
            if existing.data.downcast_ref::<Vec<T>>().is_none() {
                return Err(Error::AlreadyExistsWithDifferentType {
                    path: dataset_path.to_string(),
                });
            }
            return Ok(());
        }
        guard.insert(
            dataset_path.to_string(),
            Entry {
                len: 0,
                data: Box::new(Vec::<T>::new()),
            },
        );
        Ok(())
    }

    fn extend_dataset<T: super::Row>(&self, dataset_path: &str, new_len: u64) -> Result<()> {
        let mut guard = self.datasets.lock();
        let entry = guard.entry(dataset_path.to_string()).or_insert_with(|| Entry {
            len: 0,
            data: Box::new(Vec::<T>::new()),
        });
        let vec = entry
            .data
            .downcast_mut::<Vec<T>>()
            .ok_or_else(|| Error::AlreadyExistsWithDifferentType {
                path: dataset_path.to_string(),
            })?;
        if (new_len as usize) > vec.len() {
            vec.resize(new_len as usize, T::default());
        }
        entry.len = entry.len.max(new_len as usize);
        Ok(())
    }

    fn write_slice<T: super::Row>(&self, dataset_path: &str, start: u64, rows: &[T]) -> Result<()> {
        let mut guard = self.datasets.lock();
        let entry = guard.get_mut(dataset_path).ok_or_else(|| Error::NotFound {
            path: dataset_path.to_string(),
        })?;
        let vec = entry
            .data
            .downcast_mut::<Vec<T>>()
            .ok_or_else(|| Error::AlreadyExistsWithDifferentType {
                path: dataset_path.to_string(),
            })?;
        let start = start as usize;
        if start + rows.len() > vec.len() {
            vec.resize(start + rows.len(), T::default());
        }
        vec[start..start + rows.len()].clone_from_slice(rows);
        entry.len = entry.len.max(vec.len());
        Ok(())
    }

    fn read_slice<T: super::Row>(&self, dataset_path: &str, start: u64, len: u64) -> Result<Vec<T>> {
        let guard = self.datasets.lock();
        let entry = guard.get(dataset_path).ok_or_else(|| Error::NotFound {
            path: dataset_path.to_string(),
        })?;
        let vec = entry
            .data
            .downcast_ref::<Vec<T>>()
            .ok_or_else(|| Error::AlreadyExistsWithDifferentType {
                path: dataset_path.to_string(),
            })?;
        let start = start as usize;
        let end = start + len as usize;
        if end > entry.len {
            return Err(Error::InvalidSelection {
                index: end as i64 - 1,
                population: entry.len as u64,
            });
        }
        Ok(vec[start..end].to_vec())
    }

    fn delete_group(&self, group_path: &str) -> Result<()> {
        let mut guard = self.datasets.lock();
        let prefix = format!("{}/", group_path.trim_end_matches('/'));
        guard.retain(|k, _| !(k == group_path || k.starts_with(&prefix)));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl MemoryContainer {
    pub fn len_of<T: super::Row>(&self, dataset_path: &str) -> Option<usize> {
        let guard = self.datasets.lock();
        guard
            .get(dataset_path)
            .and_then(|e| e.data.downcast_ref::<Vec<T>>())
            .map(Vec::len)
    }
}
