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

//! `Sum`: a minimal example stage, reducing one required join's per-row
//! values to a single `f64` and appending the result to an output dataset.
//! Stands in for the kind of per-event reduction a real detector-data
//! workflow chains many of (energy sums, hit counts, cluster totals).

use std::ops::Range;

use linkme::distributed_slice;

use h5flow_config::registry::{ModuleTier, StageRegistration, STAGE_REGISTRY};
use h5flow_engine::{Cache, RequiredDataset, Result, Stage};
use h5flow_storage::SharedDataManager;

pub struct SumStage {
    requirement: RequiredDataset,
    output: String,
    data: SharedDataManager,
}

impl SumStage {
    pub fn new(params: &serde_yaml::Value, data: &SharedDataManager) -> anyhow::Result<Self> {
        let input = params
            .get("input")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Sum stage requires an `input` path"))?
            .to_string();
        let output = params
            .get("output")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Sum stage requires an `output` path"))?
            .to_string();
        Ok(Self {
            requirement: RequiredDataset::Path(input),
            output,
            data: data.clone(),
        })
    }
}

impl Stage for SumStage {
    fn init(&mut self, _source_name: &str) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, _source_name: &str, source_slice: Range<u64>, cache: &mut Cache) -> Result<()> {
        let joined = cache.get::<f64>(&self.requirement.cache_name())?;
        let n = (source_slice.end - source_slice.start) as usize;
        let sums: Vec<f64> = (0..n).map(|row| joined.row(row).flatten().sum()).collect();

        self.data.create_dataset_f64(&self.output)?;
        let offset = self.data.reserve_rows_f64(&self.output, sums.len() as u64)?;
        self.data.write_data_f64(&self.output, offset, &sums)?;
        Ok(())
    }

    fn finish(&mut self, _source_name: &str) -> Result<()> {
        Ok(())
    }

    fn requires(&self) -> &[RequiredDataset] {
        std::slice::from_ref(&self.requirement)
    }
}

#[distributed_slice(STAGE_REGISTRY)]
static SUM_STAGE: StageRegistration = StageRegistration {
    name: "Sum",
    tier: ModuleTier::BuiltIn,
    factory: |params, data| Ok(Box::new(SumStage::new(params, data)?)),
};

#[cfg(test)]
mod tests {
    use super::*;
    use h5flow_common::MaskedRect;
    use h5flow_storage::{DataManager, MemoryContainer};
    use h5flow_substrate::StubSubstrate;
    use std::sync::Arc;

    fn data_manager() -> SharedDataManager {
        Arc::new(DataManager::new(MemoryContainer::new(), Arc::new(StubSubstrate)))
    }

    #[test]
    fn sum_stage_writes_one_row_per_source_row() {
        let data = data_manager();
        let params: serde_yaml::Value = serde_yaml::from_str("input: /B\noutput: /sums\n").unwrap();
        let mut stage = SumStage::new(&params, &data).unwrap();

        let mut cache = Cache::new();
        cache.register("/B", || {
            let mut rect: MaskedRect<f64> = MaskedRect::filled(2, 2, 0.0);
            rect.set(0, 0, 1.0);
            rect.set(0, 1, 2.0);
            rect.set(1, 0, 10.0);
            Ok(Box::new(rect) as Box<dyn std::any::Any + Send>)
        });

        stage.run("/A", 0..2, &mut cache).unwrap();

        let written_len = data.reserve_rows_f64("/sums", 0).unwrap();
        assert_eq!(written_len, 2);
    }

    #[test]
    fn new_rejects_missing_output() {
        let data = data_manager();
        let params: serde_yaml::Value = serde_yaml::from_str("input: /B\n").unwrap();
        assert!(SumStage::new(&params, &data).is_err());
    }

    #[test]
    fn sum_stage_creates_its_output_dataset_against_a_real_container() {
        use h5flow_storage::Container as _;
        use h5flow_storage::Hdf5Container;

        let dir = tempfile::tempdir().unwrap();
        let container = Hdf5Container::create(&dir.path().join("out.h5")).unwrap();
        let data: SharedDataManager = Arc::new(DataManager::new(container, Arc::new(StubSubstrate)));

        let params: serde_yaml::Value = serde_yaml::from_str("input: /B\noutput: /sums\n").unwrap();
        let mut stage = SumStage::new(&params, &data).unwrap();

        let mut cache = Cache::new();
        cache.register("/B", || {
            let mut rect: MaskedRect<f64> = MaskedRect::filled(1, 1, 0.0);
            rect.set(0, 0, 4.0);
            Ok(Box::new(rect) as Box<dyn std::any::Any + Send>)
        });

        // Against `Hdf5Container`, `extend_dataset` fails unless the dataset
        // was created first; this would panic before `create_dataset_f64`
        // was added to `run`.
        stage.run("/A", 0..1, &mut cache).unwrap();
    }
}
