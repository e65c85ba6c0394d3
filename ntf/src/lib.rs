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
//! Reader for NTF-style vector transfer files.
//!
//! A dataset is fully materialized by a single read pass over the fixed-width
//! record stream and is immutable afterward: layers, features, geometries and
//! the shared spatial reference are all plain owned values.

pub mod errors;
pub mod record;
pub mod spatial_ref;
mod utils;
pub mod vector;

#[cfg(test)]
fn assert_almost_eq(a: f64, b: f64) {
    let f: f64 = a / b;
    assert!(f < 1.00001);
    assert!(f > 0.99999);
}
