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

//! The `h5flow` binary's front end: a thin `clap` surface over
//! `h5flow-config`'s binder and `h5flow-engine`'s `WorkflowManager`.
//! `run` is the single entry point `main` and tests both call, so a test
//! exercises the exact same path a real invocation does.

mod cache_builder;
mod error;

// Pulls the built-in generator/stage/resource registrations into the link
// unit; nothing here calls into the crate by name.
use h5flow_modules as _;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use h5flow_config::config::{self, Document};
use h5flow_config::DefaultLoopRange;
use h5flow_storage::path::data_path;
use h5flow_storage::{Container, DataManager, ErasedDataManager, Hdf5Container};
use h5flow_substrate::Substrate;

pub use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "h5flow")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Runs a workflow to completion on this rank.
    Run(RunOpts),
}

#[derive(clap::Args, Debug)]
pub struct RunOpts {
    /// Path to the workflow configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Path the workflow writes into.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Existing file copied to `output` before the run starts, if given.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// First source row to process (defaults to 0).
    #[arg(short = 's', long = "start")]
    pub start: Option<u64>,

    /// One past the last source row to process (defaults to the current
    /// length of the source dataset).
    #[arg(short = 'e', long = "end")]
    pub end: Option<u64>,

    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Runs `opts` to completion and returns the process exit code: 0 success,
/// 1 configuration/discovery error, 2 I/O error, 3 workflow-runtime error.
pub fn run(opts: RunOpts) -> ExitCode {
    match run_inner(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "h5flow run failed");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run_inner(opts: RunOpts) -> Result<(), CliError> {
    let substrate = h5flow_substrate::init();

    prepare_output_file(opts.input.as_deref(), &opts.output)?;
    let container = if opts.output.exists() {
        Hdf5Container::open_rw(&opts.output)?
    } else {
        Hdf5Container::create(&opts.output)?
    };
    let data = Arc::new(DataManager::new(container, substrate.clone()));
    let erased: Arc<dyn ErasedDataManager> = data.clone();

    // `flow.source` names either a custom generator block (whose `end` the
    // block's own params decide) or a bare dataset path consumed by the
    // default `LoopGenerator`; in the latter case an unspecified `-e`
    // defaults to that dataset's current length.
    let end = match opts.end {
        Some(end) => end,
        None => {
            let expanded = config::expand_includes(&opts.config)?;
            let doc: Document = serde_yaml::from_str(&expanded).map_err(h5flow_config::Error::from)?;
            if doc.blocks.contains_key(&doc.flow.source) {
                0
            } else {
                data.container()
                    .dataset_len(&data_path(&doc.flow.source))?
                    .unwrap_or(0)
            }
        }
    };
    let default_range = DefaultLoopRange {
        start: opts.start.unwrap_or(0),
        end,
        chunk: 1024,
        rank: substrate.rank(),
        size: substrate.size(),
    };

    let bound = h5flow_config::bind(&opts.config, default_range, &erased)?;

    let cache_builder = cache_builder::build(data.clone(), bound.source_name.clone(), bound.requirements);

    let finish_data = data.clone();
    let finish_file = Box::new(move |drop_list: &[String]| -> h5flow_engine::Result<()> {
        for path in drop_list {
            finish_data.delete(path)?;
        }
        finish_data.finish()?;
        Ok(())
    });

    let mut manager = h5flow_engine::WorkflowManager::new(
        substrate,
        bound.source_name,
        bound.generator,
        bound.stages,
        bound.resources,
        cache_builder,
        bound.drop_list,
        finish_file,
    );

    manager.run()?;
    Ok(())
}

fn prepare_output_file(input: Option<&std::path::Path>, output: &std::path::Path) -> Result<(), CliError> {
    let Some(input) = input else { return Ok(()) };
    if input == output || output.exists() {
        return Ok(());
    }
    std::fs::copy(input, output).map_err(|source| CliError::PrepareOutput {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}
