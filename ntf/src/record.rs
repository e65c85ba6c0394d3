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
//! Record tokenizer for NTF-style transfer files.
//!
//! A physical record is one line of at most 80 ASCII characters: a two-digit
//! record descriptor, the payload, and a final marker character. `%` ends the
//! logical record, `1` announces a continuation line (descriptor `00`).

use std::io::BufRead;

use anyhow::Result;

use crate::errors::*;

pub const MAX_PHYSICAL_RECORD_LEN: usize = 80;
pub const RECORD_TERMINATOR: char = '%';
pub const RECORD_CONTINUATION: char = '1';

/// Descriptor of a continuation line.
pub const REC_CONTINUATION: u8 = 0;
pub const REC_VOLHDREC: u8 = 1;
pub const REC_DBHREC: u8 = 2;
pub const REC_FEATCLASS: u8 = 5;
pub const REC_SECHREC: u8 = 7;
pub const REC_SPATREF: u8 = 8;
pub const REC_ATTREC: u8 = 14;
pub const REC_POINTREC: u8 = 15;
pub const REC_NODEREC: u8 = 16;
pub const REC_GEOMETRY: u8 = 21;
pub const REC_LINEREC: u8 = 23;
pub const REC_POLYREC: u8 = 24;
pub const REC_TEXTREC: u8 = 43;
pub const REC_VOLTERM: u8 = 99;

/// One logical record: descriptor code, assembled payload (continuation
/// payloads concatenated), and the line number of its first physical record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub rec_type: u8,
    pub payload: String,
    pub line: usize,
}

/// Lazy, finite, non-restartable sequence of logical records.
///
/// Each item is a `Result`; a malformed physical record consumes exactly one
/// input line, so a lenient caller can skip the error and keep iterating.
pub struct RecordReader<R: BufRead> {
    src: R,
    line_no: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(src: R) -> RecordReader<R> {
        RecordReader { src, line_no: 0 }
    }

    /// Number of the last physical line read (1-based).
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Reads one physical record: (descriptor, payload, has-continuation).
    fn next_physical(&mut self) -> Option<Result<(u8, String, bool)>> {
        let mut buf = String::new();
        match self.src.read_line(&mut buf) {
            Err(err) => {
                self.line_no += 1;
                return Some(Err(err.into()));
            }
            Ok(0) => {
                return None;
            }
            Ok(_) => {}
        }
        self.line_no += 1;
        let line = buf.trim_end_matches(['\n', '\r'].as_ref());

        if !line.is_ascii() || line.len() < 3 {
            return Some(Err(ErrorKind::MalformedRecord {
                line: self.line_no,
                msg: format!("physical record too short or not ASCII: '{}'", line),
            }
            .into()));
        }
        if line.len() > MAX_PHYSICAL_RECORD_LEN {
            return Some(Err(ErrorKind::MalformedRecord {
                line: self.line_no,
                msg: format!("physical record longer than {} characters", MAX_PHYSICAL_RECORD_LEN),
            }
            .into()));
        }

        let descriptor = &line[0..2];
        if !descriptor.bytes().all(|b| b.is_ascii_digit()) {
            return Some(Err(ErrorKind::MalformedRecord {
                line: self.line_no,
                msg: format!("record descriptor is not numeric: '{}'", descriptor),
            }
            .into()));
        }
        let rec_type = descriptor.parse::<u8>().unwrap();

        let marker = line.chars().last().unwrap();
        let continued = match marker {
            RECORD_TERMINATOR => false,
            RECORD_CONTINUATION => true,
            _ => {
                return Some(Err(ErrorKind::MalformedRecord {
                    line: self.line_no,
                    msg: format!(
                        "record does not end with '{}' or '{}': '{}'",
                        RECORD_TERMINATOR, RECORD_CONTINUATION, marker
                    ),
                }
                .into()));
            }
        };

        let payload = line[2..line.len() - 1].to_string();
        Some(Ok((rec_type, payload, continued)))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (rec_type, mut payload, mut continued) = match self.next_physical()? {
            Err(err) => return Some(Err(err)),
            Ok(r) => r,
        };
        let line = self.line_no;

        if rec_type == REC_CONTINUATION {
            return Some(Err(ErrorKind::MalformedRecord {
                line,
                msg: "continuation record without a preceding record".to_string(),
            }
            .into()));
        }

        while continued {
            match self.next_physical() {
                None => {
                    return Some(Err(ErrorKind::MalformedRecord {
                        line: self.line_no,
                        msg: "record continues past end of input".to_string(),
                    }
                    .into()));
                }
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok((next_type, next_payload, next_continued))) => {
                    if next_type != REC_CONTINUATION {
                        return Some(Err(ErrorKind::MalformedRecord {
                            line: self.line_no,
                            msg: format!(
                                "expected continuation record (descriptor 00), found {:02}",
                                next_type
                            ),
                        }
                        .into()));
                    }
                    payload.push_str(&next_payload);
                    continued = next_continued;
                }
            }
        }

        Some(Ok(RawRecord {
            rec_type,
            payload,
            line,
        }))
    }
}
