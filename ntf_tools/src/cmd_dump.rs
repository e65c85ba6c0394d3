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
use itertools::Itertools;
use ntf::vector::{Dataset, Layer, ReadOptions, Strictness};
use structopt::StructOpt;

/*
cargo run --release --bin ntf_tools -- dump \
    --input /data/SS.ntf \
    --layer-name STRATEGI_POINT
*/

#[derive(StructOpt)]
pub struct DumpArgs {
    #[structopt(parse(from_os_str), long, short = "i", help = "NTF file to read")]
    pub(crate) input: PathBuf,

    #[structopt(long, short = "l", help = "Layer to dump, all layers when omitted")]
    pub(crate) layer_name: Option<String>,

    #[structopt(long, help = "Skip malformed records instead of aborting")]
    pub(crate) lenient: bool,
}

fn dump_layer(layer: &Layer) {
    println!("== {} ==", layer.name());
    for feature in layer.features() {
        let fields = feature
            .fields()
            .map(|(name, value)| format!("{}={}", name, value))
            .join("; ");
        println!("{}\t{}\t{}", feature.fid(), feature.geometry().wkt(), fields);
    }
}

pub fn dump_features(args: &DumpArgs) -> Result<()> {
    let strictness = if args.lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };
    let dataset = Dataset::open_with(&args.input, ReadOptions { strictness })?;

    match &args.layer_name {
        Some(name) => {
            dump_layer(dataset.layer_by_name(name)?);
        }
        None => {
            for layer in dataset.layers() {
                dump_layer(layer);
            }
        }
    }

    Ok(())
}
