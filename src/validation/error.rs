// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{dft::DftError, io::read::ReadError};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("The maximum difference from the reference visibilities ({difference:e}) exceeds the tolerance ({tolerance:e})")]
    ToleranceExceeded { difference: f64, tolerance: f64 },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Dft(#[from] DftError),
}
