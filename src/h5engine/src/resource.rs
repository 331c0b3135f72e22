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

//! Workflow-scope singleton resources, modeled as an explicit container
//! owned by the manager and handed to stages by reference, not
//! process-wide state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Read-only after `init`; resources may publish derived tables during
/// `init` but MUST NOT mutate during `run`.
pub trait Resource: Send + Sync {
    fn init(&mut self) -> Result<()>;
}

/// Keyed by classname; at most one instance per class per workflow.
/// Initialized after the data manager is up and before stage `init` runs.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `init` on `resource` and registers it under `classname`.
    pub fn init_and_insert(&mut self, classname: impl Into<String>, mut resource: Box<dyn Resource>) -> Result<()> {
        resource.init()?;
        self.resources.insert(classname.into(), Arc::from(resource));
        Ok(())
    }

    pub fn get(&self, classname: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(classname)
            .cloned()
            .ok_or_else(|| Error::UnknownResource {
                classname: classname.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);
    impl Resource for Counter {
        fn init(&mut self) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn init_and_insert_runs_init_before_the_resource_is_reachable() {
        let mut registry = ResourceRegistry::new();
        registry.init_and_insert("counter", Box::new(Counter(0))).unwrap();
        let looked_up = registry.get("counter").unwrap();
        let _ = looked_up;
    }

    #[test]
    fn unknown_classname_is_an_error() {
        let registry = ResourceRegistry::new();
        assert!(registry.get("missing").is_err());
    }
}
