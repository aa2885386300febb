// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all direct_dft CLI errors. This should be the *only* error
//! enum that the binary sees.

use thiserror::Error;

use crate::{ConfigError, DftError, ValidationError, WriteError};

/// The *only* publicly visible error from the direct_dft binary. Loading
/// sources and loading visibilities both fail with a
/// [`ReadError`](crate::ReadError), so those are converted explicitly by the
/// caller rather than with a `From` impl.
#[derive(Error, Debug)]
pub enum DftCliError {
    /// Sources couldn't be read or generated.
    #[error("Couldn't load sources: {0}")]
    SourceLoad(String),

    /// Visibilities couldn't be read or generated.
    #[error("Couldn't load visibilities: {0}")]
    VisibilityLoad(String),

    /// The DFT couldn't be run on the requested device.
    #[error("Device error: {0}")]
    Device(String),

    /// Computed visibilities couldn't be written.
    #[error("Couldn't save visibilities: {0}")]
    Write(String),

    /// The validation harness failed, or found too large a difference.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad arguments, or a bad arguments file.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further.
    #[error("{0}")]
    Generic(String),
}

impl From<ConfigError> for DftCliError {
    fn from(e: ConfigError) -> Self {
        Self::ArgFile(e.to_string())
    }
}

impl From<DftError> for DftCliError {
    fn from(e: DftError) -> Self {
        Self::Device(e.to_string())
    }
}

impl From<WriteError> for DftCliError {
    fn from(e: WriteError) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<ValidationError> for DftCliError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<std::io::Error> for DftCliError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
