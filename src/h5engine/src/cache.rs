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

//! Per-iteration cache of pre-loaded slices and required joins, with
//! lazy reload: an entry is only materialized the first time a stage
//! asks for it.
//!
//! Each entry keeps its producer alongside whatever it last materialized,
//! so [`Cache::evict`] can drop the materialized value without losing the
//! ability to rebuild it. `get` re-invokes the producer whenever the slot
//! is empty, rematerializing from current on-disk state rather than a
//! snapshot taken at iteration start.

use std::any::Any;
use std::collections::HashMap;

use h5flow_common::MaskedRect;

use crate::error::{Error, Result};

type Producer = Box<dyn Fn() -> Result<Box<dyn Any + Send>> + Send>;

struct Slot {
    producer: Producer,
    materialized: Option<Box<dyn Any + Send>>,
}

/// Map from required-dataset name to its pre-materialized join, built
/// fresh by the manager for every loop iteration.
#[derive(Default)]
pub struct Cache {
    slots: HashMap<String, Slot>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named entry with the closure that (re)materializes it.
    /// The manager calls this once per required dataset before handing the
    /// cache to the first stage of the iteration.
    pub fn register<F>(&mut self, name: impl Into<String>, producer: F)
    where
        F: Fn() -> Result<Box<dyn Any + Send>> + Send + 'static,
    {
        self.slots.insert(
            name.into(),
            Slot {
                producer: Box::new(producer),
                materialized: None,
            },
        );
    }

    /// Returns the named entry as a `MaskedRect<T>`, materializing it on
    /// first access or after an eviction.
    pub fn get<T: 'static>(&mut self, name: &str) -> Result<&MaskedRect<T>> {
        let slot = self.slots.get_mut(name).ok_or_else(|| Error::UnknownCacheEntry {
            name: name.to_string(),
        })?;
        if slot.materialized.is_none() {
            slot.materialized = Some((slot.producer)()?);
        }
        slot.materialized
            .as_ref()
            .expect("just materialized above")
            .downcast_ref::<MaskedRect<T>>()
            .ok_or_else(|| Error::CacheTypeMismatch { name: name.to_string() })
    }

    /// Drops the materialized value for `name`, if present, so the next
    /// `get` rebuilds it from current on-disk state.
    pub fn evict(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.materialized = None;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}
