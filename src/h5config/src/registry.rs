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

//! Module discovery as a compile-time registry rather than a directory
//! scan. Every built-in and user plugin crate registers `(classname,
//! factory)` pairs into a [`linkme::distributed_slice`]; the original
//! three-root search order survives as *registry precedence* rather than
//! filesystem scanning.

use linkme::distributed_slice;

use h5flow_engine::{Generator, Resource, Stage};
use h5flow_storage::SharedDataManager;

use crate::error::{Error, Result};

/// Registry precedence, lowest value wins when two crates register the
/// same classname — mirrors the cwd > sibling `./modules/` > built-in
/// search order the registry stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModuleTier {
    /// Registered by the binary's own crate (stands in for "current
    /// working directory": a user building a custom binary links their
    /// stage crate directly).
    OwnCrate = 0,
    /// Registered by a crate the user lists as a `modules` path
    /// dependency (stands in for sibling `./modules/`).
    ModulesPathDep = 1,
    /// Registered by `h5flow_modules`, the built-in library.
    BuiltIn = 2,
}

/// A classname's constructor. Every factory receives the workflow's shared
/// data manager alongside its configured `params`, since a custom
/// generator must `reserve_rows` for the source table it creates (see
/// SPEC_FULL.md Open Question decision 1) and a stage may need to persist
/// a derived dataset.
pub struct GeneratorRegistration {
    pub name: &'static str,
    pub tier: ModuleTier,
    pub factory: fn(&serde_yaml::Value, &SharedDataManager) -> anyhow::Result<Box<dyn Generator>>,
}

pub struct StageRegistration {
    pub name: &'static str,
    pub tier: ModuleTier,
    pub factory: fn(&serde_yaml::Value, &SharedDataManager) -> anyhow::Result<Box<dyn Stage>>,
}

pub struct ResourceRegistration {
    pub name: &'static str,
    pub tier: ModuleTier,
    pub factory: fn(&serde_yaml::Value, &SharedDataManager) -> anyhow::Result<Box<dyn Resource>>,
}

#[distributed_slice]
pub static GENERATOR_REGISTRY: [GeneratorRegistration] = [..];

#[distributed_slice]
pub static STAGE_REGISTRY: [StageRegistration] = [..];

#[distributed_slice]
pub static RESOURCE_REGISTRY: [ResourceRegistration] = [..];

/// Picks the highest-precedence (lowest tier) registration matching
/// `name`, breaking ties by slice order — preserving "the first source
/// file defining a symbol of that name wins".
fn resolve<'a, T>(entries: &'a [T], name: &str, tier_of: impl Fn(&T) -> ModuleTier, name_of: impl Fn(&T) -> &str) -> Option<&'a T> {
    entries
        .iter()
        .filter(|e| name_of(e) == name)
        .min_by_key(|e| tier_of(e))
}

pub fn resolve_generator(classname: &str) -> Result<&'static GeneratorRegistration> {
    resolve(&GENERATOR_REGISTRY, classname, |e| e.tier, |e| e.name).ok_or_else(|| Error::UnknownClassname {
        classname: classname.to_string(),
    })
}

pub fn resolve_stage(classname: &str) -> Result<&'static StageRegistration> {
    resolve(&STAGE_REGISTRY, classname, |e| e.tier, |e| e.name).ok_or_else(|| Error::UnknownClassname {
        classname: classname.to_string(),
    })
}

pub fn resolve_resource(classname: &str) -> Result<&'static ResourceRegistration> {
    resolve(&RESOURCE_REGISTRY, classname, |e| e.tier, |e| e.name).ok_or_else(|| Error::UnknownClassname {
        classname: classname.to_string(),
    })
}
