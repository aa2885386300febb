// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The grid size must be a positive number, but got {0}")]
    InvalidGridSize(f64),

    #[error("The cell size must be a positive number of radians, but got {0}")]
    InvalidCellSize(f64),

    #[error("The frequency must be a positive number of Hz, but got {0}")]
    InvalidFrequency(f64),

    #[error("Argument file '{file}' doesn't have a recognised file extension! Valid extensions are: {valid}")]
    UnrecognisedExtension { file: String, valid: &'static str },

    #[error("Couldn't decode the structure of {file}:\n{err}")]
    Decode { file: String, err: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
