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

//! Self-describing container storage: the on-disk layout, the reference
//! dereferencing engine, and the collective data manager.

pub mod container;
pub mod dereference;
pub mod erased;
pub mod error;
pub mod manager;
pub mod path;
pub mod selection;
pub mod types;

pub use container::{Container, Hdf5Container, MemoryContainer, Row};
pub use dereference::{dereference, dereference_chain, dereference_indices, ChainHop, DereferenceOpts, RefDirection};
pub use erased::{ErasedDataManager, SharedDataManager};
pub use error::{Error, Result};
pub use manager::DataManager;
pub use selection::Selection;
pub use types::{RefPair, RefRegion};
