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

use std::path::Path;

use hdf5::Extents;
use ndarray::{s, Array1};

use super::Container;
use crate::error::{Error, Result};

/// The production [`Container`](super::Container) backend: a real HDF5 file
/// opened through the `hdf5` crate. This is the one place its API is
/// named directly.
pub struct Hdf5Container {
    file: hdf5::File,
}

impl Hdf5Container {
    fn dataset(&self, path: &str) -> Option<hdf5::Dataset> {
        self.file.dataset(path).ok()
    }
}

impl Container for Hdf5Container {
    fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            file: hdf5::File::create(path)?,
        })
    }

    fn open_rw(path: &Path) -> Result<Self> {
        Ok(Self {
            file: hdf5::File::open_rw(path)?,
        })
    }

    fn dataset_len(&self, dataset_path: &str) -> Result<Option<u64>> {
        match self.dataset(dataset_path) {
            Some(ds) => Ok(Some(ds.shape().first().copied().unwrap_or(0) as u64)),
            None => Ok(None),
        }
    }

    fn create_dataset<T: super::Row>(&self, dataset_path: &str, chunk: u64) -> Result<()> {
        if let Some(ds) = self.dataset(dataset_path) {
            let existing = ds.dtype()?.to_descriptor()?;
            if existing != T::type_descriptor() {
                return Err(Error::AlreadyExistsWithDifferentType {
                    path: dataset_path.to_string(),
                });
            }
            return Ok(());
        }
        self.file
            .new_dataset::<T>()
            .shape(Extents::resizable(vec![0]))
            .chunk(vec![chunk.max(1) as usize])
            .create(dataset_path)?;
        Ok(())
    }

    fn extend_dataset<T: super::Row>(&self, dataset_path: &str, new_len: u64) -> Result<()> {
        let ds = self
            .dataset(dataset_path)
            .ok_or_else(|| Error::NotFound {
                path: dataset_path.to_string(),
            })?;
        let current = ds.shape().first().copied().unwrap_or(0) as u64;
        if new_len <= current {
            return Ok(());
        }
        ds.resize((new_len as usize,))?;
        Ok(())
    }

    fn write_slice<T: super::Row>(&self, dataset_path: &str, start: u64, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let ds = self
            .dataset(dataset_path)
            .ok_or_else(|| Error::NotFound {
                path: dataset_path.to_string(),
            })?;
        let arr = Array1::from(rows.to_vec());
        let start = start as usize;
        ds.write_slice(&arr, s![start..start + rows.len()])?;
        Ok(())
    }

    fn read_slice<T: super::Row>(&self, dataset_path: &str, start: u64, len: u64) -> Result<Vec<T>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let ds = self
            .dataset(dataset_path)
            .ok_or_else(|| Error::NotFound {
                path: dataset_path.to_string(),
            })?;
        let start = start as usize;
        let arr: Array1<T> = ds.read_slice_1d(s![start..start + len as usize])?;
        Ok(arr.into_raw_vec())
    }

    fn delete_group(&self, group_path: &str) -> Result<()> {
        if self.file.group(group_path).is_ok() {
            self.file.unlink(group_path)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container as _;
    use crate::path::data_path;

    #[test]
    fn extend_dataset_fails_without_a_prior_create() {
        let dir = tempfile::tempdir().unwrap();
        let container = Hdf5Container::create(&dir.path().join("out.h5")).unwrap();

        let err = container.extend_dataset::<f64>(&data_path("/sums"), 2).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn create_then_reserve_then_write_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let container = Hdf5Container::create(&dir.path().join("out.h5")).unwrap();
        let path = data_path("/sums");

        container.create_dataset::<f64>(&path, 16).unwrap();
        container.extend_dataset::<f64>(&path, 2).unwrap();
        container.write_slice(&path, 0, &[1.5f64, 2.5]).unwrap();

        let rows: Vec<f64> = container.read_slice(&path, 0, 2).unwrap();
        assert_eq!(rows, vec![1.5, 2.5]);
    }
}
