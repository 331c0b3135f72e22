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

//! Exercises `h5flow_cli::run` the same way `main` does, through the
//! `Cli`/`Command::Run` surface, so a test and the real binary take the
//! same path.

use std::io::Write;
use std::process::ExitCode;

use h5flow_cli::RunOpts;

fn write_config(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn missing_config_file_exits_with_the_configuration_error_code() {
    let dir = tempfile::tempdir().unwrap();
    let opts = RunOpts {
        config: dir.path().join("does_not_exist.yml"),
        output: dir.path().join("out.h5"),
        input: None,
        start: None,
        end: Some(0),
        verbose: 0,
    };

    let code = h5flow_cli::run(opts);
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(1)));
}

#[test]
fn unregistered_classname_exits_with_the_configuration_error_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "flow.yml",
        "flow:\n  source: /A\n  stages: [my_stage]\nmy_stage:\n  classname: NoSuchStage\n",
    );
    let opts = RunOpts {
        config,
        output: dir.path().join("out.h5"),
        input: None,
        start: Some(0),
        end: Some(0),
        verbose: 0,
    };

    let code = h5flow_cli::run(opts);
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(1)));
}

#[test]
fn input_is_copied_to_output_before_the_run_starts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("upstream.h5");
    std::fs::write(&input, b"not a real hdf5 file, just needs to exist").unwrap();
    let output = dir.path().join("out.h5");

    // The copied file isn't valid HDF5, so opening `output` fails right
    // after the copy; this only asserts the copy happened, not that the
    // run succeeded.
    let config = write_config(dir.path(), "flow.yml", "flow:\n  source: /A\n  stages: [missing]\n");
    let opts = RunOpts {
        config,
        output: output.clone(),
        input: Some(input),
        start: Some(0),
        end: Some(0),
        verbose: 0,
    };

    let _ = h5flow_cli::run(opts);
    assert!(output.exists());
}
