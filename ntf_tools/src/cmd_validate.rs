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
use std::path::PathBuf;

use anyhow::Result;
use ntf::vector::Dataset;
use structopt::StructOpt;

/*
cargo run --release --bin ntf_tools -- validate --input /data/SS.ntf
*/

#[derive(StructOpt)]
pub struct ValidateArgs {
    #[structopt(parse(from_os_str), long, short = "i", help = "NTF file to check")]
    pub(crate) input: PathBuf,
}

pub fn validate(args: &ValidateArgs) -> Result<()> {
    match Dataset::open(&args.input) {
        Ok(dataset) => {
            let n_features: i64 = dataset.layers().map(|l| l.count()).sum();
            println!(
                "OK: {} layer(s), {} feature(s)",
                dataset.count(),
                n_features
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("INVALID: {}", err);
            std::process::exit(1);
        }
    }
}
