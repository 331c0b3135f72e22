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

//! Wires a parsed configuration to registry factories, producing the
//! pieces [`h5flow_engine::WorkflowManager`] is built from. Splits "parse
//! the YAML" from "turn the parsed shape into runnable services" into two
//! passes.

use std::path::Path;

use h5flow_engine::{Generator, LoopGenerator, RequiredDataset, Resource, ResourceRegistry, Stage};
use h5flow_storage::SharedDataManager;

use crate::config::{self, Document};
use crate::error::{Error, Result};
use crate::registry;

/// A fully resolved workflow, still missing only the runtime pieces
/// (substrate, data manager, cache builder) that depend on the CLI's
/// `--input`/`--output`/`--start`/`--end` flags rather than the config
/// file.
pub struct BoundWorkflow {
    pub source_name: String,
    pub generator: Box<dyn Generator>,
    pub stages: Vec<(String, Box<dyn Stage>)>,
    pub resources: ResourceRegistry,
    pub drop_list: Vec<String>,
    /// Every join the run needs preloaded each iteration: each stage's own
    /// `requires()` plus whatever its block's `requires:` key declared in
    /// the config, deduplicated by cache name.
    pub requirements: Vec<RequiredDataset>,
}

/// Default partitioning handed to [`h5flow_engine::LoopGenerator`] when
/// `flow.source` names a dataset path rather than a custom generator
/// block.
pub struct DefaultLoopRange {
    pub start: u64,
    pub end: u64,
    pub chunk: u64,
    pub rank: usize,
    pub size: usize,
}

/// Parses `path` (splicing `!include`s first), resolves every `classname`
/// against the compiled-in registries, and constructs one instance of
/// each. `flow.source` is either the name of a block defining a custom
/// generator, or (if no such block exists) a dataset path consumed by the
/// default [`LoopGenerator`].
pub fn bind(path: &Path, default_range: DefaultLoopRange, data: &SharedDataManager) -> Result<BoundWorkflow> {
    let expanded = config::expand_includes(path)?;
    let doc: Document = serde_yaml::from_str(&expanded)?;

    let resources = build_resources(&doc, data)?;
    let generator = build_generator(&doc, default_range, data)?;
    let (stages, requirements) = build_stages(&doc, data)?;

    Ok(BoundWorkflow {
        source_name: doc.flow.source,
        generator,
        stages,
        resources,
        drop_list: doc.flow.drop,
        requirements,
    })
}

fn build_resources(doc: &Document, data: &SharedDataManager) -> Result<ResourceRegistry> {
    let mut resources = ResourceRegistry::new();
    for block in &doc.resources {
        let registration = registry::resolve_resource(&block.classname)?;
        let instance: Box<dyn Resource> = (registration.factory)(&block.params, data)?;
        resources.init_and_insert(block.classname.clone(), instance)?;
    }
    Ok(resources)
}

fn build_generator(doc: &Document, default_range: DefaultLoopRange, data: &SharedDataManager) -> Result<Box<dyn Generator>> {
    match doc.blocks.get(&doc.flow.source) {
        Some(named) => {
            let registration = registry::resolve_generator(&named.classname)?;
            Ok((registration.factory)(&named.params, data)?)
        }
        None => Ok(Box::new(LoopGenerator::new(
            default_range.start,
            default_range.end,
            default_range.chunk,
            default_range.rank,
            default_range.size,
        ))),
    }
}

fn build_stages(doc: &Document, data: &SharedDataManager) -> Result<(Vec<(String, Box<dyn Stage>)>, Vec<RequiredDataset>)> {
    let mut stages = Vec::with_capacity(doc.flow.stages.len());
    let mut requirements = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for stage_name in &doc.flow.stages {
        let block = doc.blocks.get(stage_name).ok_or_else(|| Error::MissingRequiredKey {
            block: stage_name.clone(),
            key: "classname".to_string(),
        })?;
        let registration = registry::resolve_stage(&block.classname)?;
        let instance: Box<dyn Stage> = (registration.factory)(&block.params, data)?;

        for requirement in instance.requires() {
            if seen.insert(requirement.cache_name()) {
                requirements.push(requirement.clone());
            }
        }
        for entry in &block.requires {
            let requirement = RequiredDataset::from(entry);
            if seen.insert(requirement.cache_name()) {
                requirements.push(requirement);
            }
        }

        stages.push((stage_name.clone(), instance));
    }
    Ok((stages, requirements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkme::distributed_slice;
    use std::io::Write;
    use std::ops::Range;

    struct NoopStage;
    impl Stage for NoopStage {
        fn init(&mut self, _source_name: &str) -> h5flow_engine::Result<()> {
            Ok(())
        }
        fn run(&mut self, _source_name: &str, _source_slice: Range<u64>, _cache: &mut h5flow_engine::Cache) -> h5flow_engine::Result<()> {
            Ok(())
        }
        fn finish(&mut self, _source_name: &str) -> h5flow_engine::Result<()> {
            Ok(())
        }
    }

    #[distributed_slice(registry::STAGE_REGISTRY)]
    static BINDER_TEST_STAGE: registry::StageRegistration = registry::StageRegistration {
        name: "__binder_test_noop",
        tier: registry::ModuleTier::BuiltIn,
        factory: |_params, _data| Ok(Box::new(NoopStage)),
    };

    fn default_range() -> DefaultLoopRange {
        DefaultLoopRange {
            start: 0,
            end: 10,
            chunk: 5,
            rank: 0,
            size: 1,
        }
    }

    fn test_data_manager() -> SharedDataManager {
        use h5flow_storage::{DataManager, MemoryContainer};
        use h5flow_substrate::StubSubstrate;
        std::sync::Arc::new(DataManager::new(MemoryContainer::new(), std::sync::Arc::new(StubSubstrate)))
    }

    #[test]
    fn bind_falls_back_to_the_default_loop_generator_for_a_bare_path_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"flow:\n  source: /A\n  stages: [my_stage]\nmy_stage:\n  classname: __binder_test_noop\n")
            .unwrap();

        let bound = bind(&path, default_range(), &test_data_manager()).unwrap();
        assert_eq!(bound.source_name, "/A");
        assert_eq!(bound.stages.len(), 1);
        assert_eq!(bound.stages[0].0, "my_stage");
    }

    #[test]
    fn bind_collects_a_configured_requires_list_into_the_bound_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(
                b"flow:\n  source: /A\n  stages: [my_stage]\n\
                  my_stage:\n  classname: __binder_test_noop\n  requires: [/B, {name: joined_c, path: /C, index_only: true}]\n",
            )
            .unwrap();

        let bound = bind(&path, default_range(), &test_data_manager()).unwrap();
        let names: Vec<String> = bound.requirements.iter().map(RequiredDataset::cache_name).collect();
        assert_eq!(names, vec!["/B".to_string(), "joined_c".to_string()]);
    }

    #[test]
    fn bind_reports_missing_stage_block_as_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"flow:\n  source: /A\n  stages: [does_not_exist]\n")
            .unwrap();

        assert!(matches!(
            bind(&path, default_range(), &test_data_manager()),
            Err(Error::MissingRequiredKey { .. })
        ));
    }

    #[test]
    fn bind_rejects_an_unregistered_classname() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"flow:\n  source: /A\n  stages: [my_stage]\nmy_stage:\n  classname: NoSuchStage\n")
            .unwrap();

        assert!(matches!(
            bind(&path, default_range(), &test_data_manager()),
            Err(Error::UnknownClassname { .. })
        ));
    }
}
