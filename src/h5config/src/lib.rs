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

//! The configuration binder: parses the YAML workflow document, splices
//! `!include`s, and resolves `classname` entries against the compiled-in
//! module registries.

pub mod binder;
pub mod config;
pub mod error;
pub mod registry;

pub use binder::{bind, BoundWorkflow, DefaultLoopRange};
pub use error::{Error, Result};
pub use registry::{GeneratorRegistration, ModuleTier, ResourceRegistration, StageRegistration};
