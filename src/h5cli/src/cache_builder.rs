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

//! Turns the bound workflow's merged `requires` list into the
//! [`CacheBuilder`] closure [`h5flow_engine::WorkflowManager`] calls once
//! per iteration, preloading every declared requirement into a fresh
//! cache before any stage runs. This is the one place that
//! knows the concrete row type (`f64` for hydrated joins, `i64` for
//! `index_only` ones) behind a configured requirement, which is why it
//! lives in the CLI rather than in `h5flow-engine` itself.

use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

use h5flow_engine::{Cache, CacheBuilder, RequiredDataset};
use h5flow_storage::dereference::ChainHop;
use h5flow_storage::path::{data_path, ref_path, ref_region_path};
use h5flow_storage::{dereference, dereference_chain, dereference_indices, Container, DataManager, DereferenceOpts, Hdf5Container, Selection};

/// `region_path` exists only if its dataset has been written at least once;
/// an absent region index just means every join for this pair has always
/// gone through the full-table scan path.
fn region_path_if_present(container: &Hdf5Container, parent: &str, child: &str) -> h5flow_storage::Result<Option<String>> {
    let region = ref_region_path(parent, child);
    Ok(if container.dataset_len(&region)?.is_some() {
        Some(region)
    } else {
        None
    })
}

fn materialize_one(
    container: &Hdf5Container,
    source_name: &str,
    population: u64,
    slice: Range<u64>,
    requirement: &RequiredDataset,
) -> h5flow_storage::Result<Box<dyn Any + Send>> {
    let sel = Selection::range(slice.start, slice.end);

    match requirement {
        RequiredDataset::Path(child) => {
            let rp = ref_path(source_name, child);
            let region = region_path_if_present(container, source_name, child)?;
            let opts = DereferenceOpts {
                region_path: region.as_deref(),
                ..Default::default()
            };
            let rect = dereference::<_, f64>(container, &sel, population, &rp, &data_path(child), opts)?;
            Ok(Box::new(rect))
        }
        RequiredDataset::Keyed { path, index_only, .. } => {
            let rp = ref_path(source_name, path);
            let region = region_path_if_present(container, source_name, path)?;
            let opts = DereferenceOpts {
                region_path: region.as_deref(),
                ..Default::default()
            };
            if *index_only {
                let rect = dereference_indices(container, &sel, population, &rp, opts)?;
                Ok(Box::new(rect))
            } else {
                let rect = dereference::<_, f64>(container, &sel, population, &rp, &data_path(path), opts)?;
                Ok(Box::new(rect))
            }
        }
        RequiredDataset::Chain(groups) => {
            assert!(!groups.is_empty(), "a chain requires() entry must name at least one group");
            let mut hop_paths = Vec::with_capacity(groups.len());
            let mut populations = Vec::with_capacity(groups.len());
            let mut prev = source_name.to_string();
            let mut prev_population = population;
            for group in groups {
                hop_paths.push(ref_path(&prev, group));
                populations.push(prev_population);
                prev_population = container.dataset_len(&data_path(group))?.unwrap_or(0);
                prev = group.clone();
            }
            let hops: Vec<ChainHop<'_>> = hop_paths
                .iter()
                .zip(&populations)
                .map(|(ref_path, &population)| ChainHop {
                    ref_path,
                    region_path: None,
                    ref_direction: None,
                    population,
                })
                .collect();
            let target = data_path(groups.last().expect("checked non-empty above"));
            let rect = dereference_chain::<_, f64>(container, &sel, &hops, &target)?;
            Ok(Box::new(rect))
        }
    }
}

/// Builds the per-iteration cache from the union of every configured
/// stage's `requires()`, deduplicated by cache name (two stages declaring
/// the same join share one materialization per iteration).
pub fn build(data: Arc<DataManager<Hdf5Container>>, source_name: String, requirements: Vec<RequiredDataset>) -> CacheBuilder {
    Box::new(move |slice: Range<u64>| {
        let mut cache = Cache::new();
        let population = data
            .container()
            .dataset_len(&data_path(&source_name))?
            .unwrap_or(0);

        for requirement in &requirements {
            let cache_name = requirement.cache_name();
            let data = data.clone();
            let source_name = source_name.clone();
            let requirement = requirement.clone();
            let slice = slice.clone();
            cache.register(cache_name, move || {
                materialize_one(data.container(), &source_name, population, slice.clone(), &requirement).map_err(h5flow_engine::Error::from)
            });
        }

        Ok(cache)
    })
}
