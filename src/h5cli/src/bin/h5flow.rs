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

use std::process::ExitCode;

use clap::Parser;
use h5flow_cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Command::Run(opts) = cli.command;

    h5flow_rt::set_panic_abort();
    h5flow_rt::init_logger(h5flow_rt::LoggerSettings::from_verbosity(opts.verbose));

    h5flow_cli::run(opts)
}
