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

//! The drop-list cleanup step and the loop-termination invariant,
//! exercised against the in-memory storage stand-ins.

use std::ops::Range;
use std::sync::Arc;

use h5flow_engine::{Cache, Generator, LoopGenerator, ResourceRegistry, Stage, WorkflowManager};
use h5flow_storage::container::MemoryContainer;
use h5flow_storage::path::data_path;
use h5flow_storage::{Container, DataManager};
use h5flow_substrate::StubSubstrate;

struct NoopStage;
impl Stage for NoopStage {
    fn init(&mut self, _source_name: &str) -> h5flow_engine::Result<()> {
        Ok(())
    }
    fn run(&mut self, _source_name: &str, _source_slice: Range<u64>, _cache: &mut Cache) -> h5flow_engine::Result<()> {
        Ok(())
    }
    fn finish(&mut self, _source_name: &str) -> h5flow_engine::Result<()> {
        Ok(())
    }
}

#[test]
fn scenario_e_drop_list_removes_only_the_named_group() {
    let container = MemoryContainer::new();
    let data = Arc::new(DataManager::new(container.clone(), Arc::new(StubSubstrate)));

    data.create_dataset::<i64>("/tmp/work").unwrap();
    let off = data.reserve_rows::<i64>("/tmp/work", 3).unwrap();
    data.write_data("/tmp/work", off, &[1i64, 2, 3]).unwrap();

    data.create_dataset::<i64>("/kept").unwrap();
    let off = data.reserve_rows::<i64>("/kept", 2).unwrap();
    data.write_data("/kept", off, &[9i64, 10]).unwrap();

    let generator: Box<dyn Generator> = Box::new(LoopGenerator::new(0, 0, 1, 0, 1));
    let stages: Vec<(String, Box<dyn Stage>)> = vec![("noop".into(), Box::new(NoopStage))];

    let finish_data = data.clone();
    let drop_list = vec!["/tmp/work".to_string()];

    let mut manager = WorkflowManager::new(
        Arc::new(StubSubstrate),
        "/kept",
        generator,
        stages,
        ResourceRegistry::new(),
        Box::new(|_slice| Ok(Cache::new())),
        drop_list,
        Box::new(move |drop_list| {
            for path in drop_list {
                finish_data.delete(path)?;
            }
            finish_data.finish()?;
            Ok(())
        }),
    );

    manager.run().unwrap();

    assert_eq!(container.dataset_len(&data_path("/tmp/work")).unwrap(), None);
    assert_eq!(container.dataset_len(&data_path("/kept")).unwrap(), Some(2));
}

#[test]
fn invariant_termination_loop_ends_only_when_every_rank_is_empty() {
    // Single rank with a generator that yields two ranges then drains: the
    // loop must run exactly twice before the allreduce-AND trips.
    let generator: Box<dyn Generator> = Box::new(LoopGenerator::new(0, 7, 4, 0, 1));
    let stages: Vec<(String, Box<dyn Stage>)> = vec![("noop".into(), Box::new(NoopStage))];

    let mut manager = WorkflowManager::new(
        Arc::new(StubSubstrate),
        "/A",
        generator,
        stages,
        ResourceRegistry::new(),
        Box::new(|_slice| Ok(Cache::new())),
        vec![],
        Box::new(|_drop_list| Ok(())),
    );

    manager.run().unwrap();
    assert_eq!(manager.state(), h5flow_engine::RunState::Closed);
}
