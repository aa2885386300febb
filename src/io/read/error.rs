// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from loading sources and visibilities.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Couldn't open {file}: {err}")]
    OpenFile { file: String, err: std::io::Error },

    #[error("{file} is empty; expected the first line to be a count")]
    MissingCount { file: String },

    #[error("{file} line {line_num}: Couldn't parse '{string}' as a count")]
    BadCount {
        file: String,
        line_num: usize,
        string: String,
    },

    #[error("{file} line {line_num}: Couldn't parse '{string}' as a float")]
    ParseFloat {
        file: String,
        line_num: usize,
        string: String,
    },

    #[error("{file} line {line_num}: Expected {expected} fields, but found {found}")]
    WrongFieldCount {
        file: String,
        line_num: usize,
        expected: usize,
        found: usize,
    },

    #[error("{file} declares {expected} records, but only {found} were found")]
    Truncated {
        file: String,
        expected: usize,
        found: usize,
    },

    #[error("Unable to allocate memory for {count} {what}")]
    Allocation { count: usize, what: &'static str },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
