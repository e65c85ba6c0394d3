/*
This file is part of the NTF Vector Toolkit
Copyright (C) 2022 Novel-T

The NTF Vector Toolkit is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use crate::cmd_dump::{dump_features, DumpArgs};
use crate::cmd_info::{print_info, InfoArgs};
use crate::cmd_validate::{validate, ValidateArgs};

mod cmd_dump;
mod cmd_info;
mod cmd_validate;

#[derive(StructOpt)]
struct Cli {
    #[structopt(long, default_value = "Warn")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    #[structopt(help = "Prints dataset name, creation date, and per layer the geometry type, feature count and spatial reference")]
    Info(InfoArgs),
    #[structopt(help = "Prints features of a layer as fid, WKT and attribute fields")]
    Dump(DumpArgs),
    #[structopt(help = "Opens a dataset in strict mode and reports the first problem found")]
    Validate(ValidateArgs),
}

fn run() -> Result<()> {
    let args = Cli::from_args();

    SimpleLogger::new().with_level(args.log_level).init()?;

    match &args.cmd {
        Command::Info(r) => {
            print_info(r)?;
        }
        Command::Dump(r) => {
            dump_features(r)?;
        }
        Command::Validate(r) => {
            validate(r)?;
        }
    }

    Ok(())
}

fn main() {
    run().unwrap();
}
