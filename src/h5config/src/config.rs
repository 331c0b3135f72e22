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

//! The configuration document shape and `!include` splicing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use h5flow_engine::RequiredDataset;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct FlowSection {
    pub source: String,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub drop: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceBlock {
    pub classname: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
pub struct NamedBlock {
    pub classname: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
    #[serde(default)]
    pub requires: Vec<RequiresEntry>,
}

/// The three `<name>.requires` shapes a config block can declare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RequiresEntry {
    Path(String),
    Chain(Vec<String>),
    Keyed {
        name: String,
        path: String,
        #[serde(default)]
        index_only: bool,
    },
}

impl From<&RequiresEntry> for RequiredDataset {
    fn from(entry: &RequiresEntry) -> Self {
        match entry {
            RequiresEntry::Path(path) => RequiredDataset::Path(path.clone()),
            RequiresEntry::Chain(hops) => RequiredDataset::Chain(hops.clone()),
            RequiresEntry::Keyed { name, path, index_only } => RequiredDataset::Keyed {
                name: name.clone(),
                path: path.clone(),
                index_only: *index_only,
            },
        }
    }
}

/// Unknown top-level keys are permitted (ignored) for forward-compatible
/// configs; required keys are validated by each factory's constructor.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub flow: FlowSection,
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
    #[serde(flatten)]
    pub blocks: HashMap<String, NamedBlock>,
}

/// Recursively splices `!include <relative path>` lines, resolved against
/// the including document's own directory, into one flat YAML document
/// before parsing. A single textual-substitution pass, with no
/// template/id expansion. Returns `InclusionLoop` if a file includes
/// itself, directly or transitively.
pub fn expand_includes(path: &Path) -> Result<String> {
    let mut visiting = Vec::new();
    expand_includes_inner(path, &mut visiting)
}

fn expand_includes_inner(path: &Path, visiting: &mut Vec<PathBuf>) -> Result<String> {
    let canonical = path.canonicalize().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if visiting.contains(&canonical) {
        visiting.push(canonical);
        return Err(Error::InclusionLoop(visiting.clone()));
    }
    visiting.push(canonical);

    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut out = String::new();
    for line in raw.lines() {
        match line.trim_start().strip_prefix("!include ") {
            Some(rest) => {
                let included = dir.join(rest.trim());
                out.push_str(&expand_includes_inner(&included, visiting)?);
                out.push('\n');
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    visiting.pop();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn expand_includes_splices_a_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        let included_path = dir.path().join("stages.yml");
        std::fs::File::create(&included_path)
            .unwrap()
            .write_all(b"my_stage:\n  classname: Noop\n")
            .unwrap();

        let main_path = dir.path().join("main.yml");
        std::fs::File::create(&main_path)
            .unwrap()
            .write_all(b"flow:\n  source: /A\n!include stages.yml\n")
            .unwrap();

        let expanded = expand_includes(&main_path).unwrap();
        assert!(expanded.contains("my_stage"));
        assert!(expanded.contains("classname: Noop"));
    }

    #[test]
    fn expand_includes_detects_a_self_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.yml");
        std::fs::File::create(&path).unwrap().write_all(b"!include loop.yml\n").unwrap();

        assert!(matches!(expand_includes(&path), Err(Error::InclusionLoop(_))));
    }

    #[test]
    fn document_parses_flow_resources_and_named_blocks() {
        let yaml = r#"
flow:
  source: /A
  stages: [my_stage]
  drop: [/tmp/work]
resources:
  - classname: Geometry
    params: {path: /geo}
my_stage:
  classname: Cluster
  params: {threshold: 3}
  requires: [/B, {name: joined_c, path: /C, index_only: true}]
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.flow.source, "/A");
        assert_eq!(doc.flow.stages, vec!["my_stage"]);
        assert_eq!(doc.flow.drop, vec!["/tmp/work"]);
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].classname, "Geometry");
        let stage = doc.blocks.get("my_stage").unwrap();
        assert_eq!(stage.classname, "Cluster");
        assert_eq!(stage.requires.len(), 2);
    }
}
