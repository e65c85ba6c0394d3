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
use crate::errors::*;
use anyhow::Result;

/// Fixed-width field access into a logical record payload.
/// `start`/`len` are byte offsets; payloads are ASCII by construction.
pub(crate) fn _slice<'p>(
    payload: &'p str,
    line: usize,
    start: usize,
    len: usize,
    what: &str,
) -> Result<&'p str> {
    if payload.len() < start + len {
        Err(ErrorKind::MalformedRecord {
            line,
            msg: format!(
                "payload too short for {} (need {} chars, have {})",
                what,
                start + len,
                payload.len()
            ),
        })?;
    }
    Ok(&payload[start..start + len])
}

/// Fixed-width run of decimal digits, e.g. feature ids and raw ordinates.
pub(crate) fn _digits(
    payload: &str,
    line: usize,
    start: usize,
    len: usize,
    what: &str,
) -> Result<i64> {
    let s = _slice(payload, line, start, len, what)?;
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        Err(ErrorKind::MalformedRecord {
            line,
            msg: format!("{} is not numeric: '{}'", what, s),
        })?;
    }
    Ok(s.parse::<i64>().unwrap())
}

/// Space-padded decimal field, e.g. the section header multiplier and origins.
pub(crate) fn _decimal(
    payload: &str,
    line: usize,
    start: usize,
    len: usize,
    what: &str,
) -> Result<f64> {
    let s = _slice(payload, line, start, len, what)?.trim();
    s.parse::<f64>().map_err(|_| {
        ErrorKind::MalformedRecord {
            line,
            msg: format!("{} is not a decimal number: '{}'", what, s),
        }
        .into()
    })
}
