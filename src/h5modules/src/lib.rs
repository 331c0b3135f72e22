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

//! Built-in generators/stages/resources, registered at
//! [`h5flow_config::registry::ModuleTier::BuiltIn`], the third and
//! lowest-precedence search root. Every symbol here is an example of
//! the kind of component a user's own `modules` crate would provide at
//! higher precedence; none is required by the engine itself.

pub mod generator;
pub mod resource;
pub mod stage;
