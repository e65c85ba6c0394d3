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
use ntf::vector::{field_type_to_name, geometry_type_to_name, Dataset, ReadOptions, Strictness};
use structopt::StructOpt;

/*
cargo run --release --bin ntf_tools -- info --input /data/SS.ntf
*/

#[derive(StructOpt)]
pub struct InfoArgs {
    #[structopt(parse(from_os_str), long, short = "i", help = "NTF file to inspect")]
    pub(crate) input: PathBuf,

    #[structopt(long, help = "Skip malformed records instead of aborting")]
    pub(crate) lenient: bool,
}

pub fn print_info(args: &InfoArgs) -> Result<()> {
    let strictness = if args.lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };
    let dataset = Dataset::open_with(&args.input, ReadOptions { strictness })?;

    println!("Dataset: {}", dataset.name());
    if let Some(date) = dataset.creation_date() {
        println!("Created: {}", date);
    }
    println!("Layers:  {}", dataset.count());

    for layer in dataset.layers() {
        println!(
            "  {} ({}) - {} feature(s)",
            layer.name(),
            geometry_type_to_name(layer.layer_definition().geometry_type()),
            layer.count()
        );
        for field in layer.layer_definition().fields() {
            println!(
                "    field {} ({})",
                field.name(),
                field_type_to_name(field.field_type())
            );
        }
        if let Ok(srs) = layer.spatial_reference() {
            println!("    srs {}", srs.to_wkt());
        }
    }

    Ok(())
}
