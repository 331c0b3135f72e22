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

//! `Constants`: a workflow-scope lookup table loaded once from the config
//! file's `params`, standing in for the kind of run-level calibration or
//! geometry table a real detector-data stage reads during `init`.

use std::collections::HashMap;

use linkme::distributed_slice;

use h5flow_config::registry::{ModuleTier, ResourceRegistration, RESOURCE_REGISTRY};
use h5flow_engine::{Resource, Result};

pub struct ConstantsResource {
    values: HashMap<String, f64>,
}

impl ConstantsResource {
    pub fn new(params: &serde_yaml::Value) -> anyhow::Result<Self> {
        let mapping = params
            .as_mapping()
            .ok_or_else(|| anyhow::anyhow!("Constants resource requires a mapping of name to number"))?;
        let mut values = HashMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = key
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Constants keys must be strings"))?
                .to_string();
            let value = value
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("Constants value for `{key}` must be numeric"))?;
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

impl Resource for ConstantsResource {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
}

#[distributed_slice(RESOURCE_REGISTRY)]
static CONSTANTS_RESOURCE: ResourceRegistration = ResourceRegistration {
    name: "Constants",
    tier: ModuleTier::BuiltIn,
    factory: |params, _data| Ok(Box::new(ConstantsResource::new(params)?)),
};
