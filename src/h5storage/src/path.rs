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

//! Path conventions for the on-disk layout: a `data` array per group, and
//! a shared `ref`/`ref_region` pair per (parent, child) edge.

pub fn data_path(group: &str) -> String {
    format!("/{}/data", trim(group))
}

pub fn ref_path(parent: &str, child: &str) -> String {
    format!("/{}/ref/{}/ref", trim(parent), trim(child))
}

pub fn ref_region_path(parent: &str, child: &str) -> String {
    format!("/{}/ref/{}/ref_region", trim(parent), trim(child))
}

fn trim(group: &str) -> &str {
    group.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_spec_layout() {
        assert_eq!(data_path("/A"), "/A/data");
        assert_eq!(ref_path("/A", "/B"), "/A/ref/B/ref"); // no leading slash on child segment
        assert_eq!(ref_path("/A", "B"), "/A/ref/B/ref");
        assert_eq!(ref_region_path("/A", "/B"), "/A/ref/B/ref_region");
    }
}
