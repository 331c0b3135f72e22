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

//! `LoopGenerator` exposed as a configurable classname, for workflows that
//! want an explicit `{start, end, chunk}` source walk instead of the
//! CLI-inferred default range (the `-s`/`-e` flags cover the common case;
//! this block covers configs that want the range checked in).

use linkme::distributed_slice;

use h5flow_config::registry::{GeneratorRegistration, ModuleTier, GENERATOR_REGISTRY};
use h5flow_engine::{Generator, LoopGenerator};

fn yaml_u64(params: &serde_yaml::Value, key: &str) -> anyhow::Result<u64> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| anyhow::anyhow!("LoopGenerator requires an integer `{key}`"))
}

fn build(params: &serde_yaml::Value, _data: &h5flow_storage::SharedDataManager) -> anyhow::Result<Box<dyn Generator>> {
    let start = yaml_u64(params, "start")?;
    let end = yaml_u64(params, "end")?;
    let chunk = params.get("chunk").and_then(|v| v.as_u64()).unwrap_or(1024);
    let rank = params.get("rank").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let size = params.get("size").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
    Ok(Box::new(LoopGenerator::new(start, end, chunk, rank, size)))
}

#[distributed_slice(GENERATOR_REGISTRY)]
static LOOP_GENERATOR: GeneratorRegistration = GeneratorRegistration {
    name: "LoopGenerator",
    tier: ModuleTier::BuiltIn,
    factory: build,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn data_manager() -> h5flow_storage::SharedDataManager {
        Arc::new(h5flow_storage::DataManager::new(
            h5flow_storage::MemoryContainer::new(),
            Arc::new(h5flow_substrate::StubSubstrate),
        ))
    }

    #[test]
    fn build_reads_start_end_chunk_from_params() {
        let params: serde_yaml::Value = serde_yaml::from_str("start: 0\nend: 6\nchunk: 2\n").unwrap();
        let mut generator = build(&params, &data_manager()).unwrap();
        generator.init().unwrap();
        assert_eq!(generator.next().unwrap(), Some(0..2));
        assert_eq!(generator.next().unwrap(), Some(2..4));
        assert_eq!(generator.next().unwrap(), Some(4..6));
        assert_eq!(generator.next().unwrap(), None);
    }

    #[test]
    fn build_rejects_a_missing_start() {
        let params: serde_yaml::Value = serde_yaml::from_str("end: 6\n").unwrap();
        assert!(build(&params, &data_manager()).is_err());
    }
}
