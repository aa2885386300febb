// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out computed visibilities.

mod error;

pub use error::WriteError;

use std::{
    fs::File,
    io::{BufWriter, Write},
};

use log::{debug, info};

use crate::{
    config::Config,
    data::{ComplexSample, Visibility},
};

/// Write visibilities and their samples to `config.vis_file`. The first line
/// is the count, then each line is `u v w real imaginary 1.0`, with `u v w`
/// converted back to wavelengths. `u v w` are written with enough digits to be
/// read back exactly; the other values have six decimal places.
pub fn save_visibilities(
    config: &Config,
    visibilities: &[Visibility],
    samples: &[ComplexSample],
) -> Result<(), WriteError> {
    if visibilities.len() != samples.len() {
        return Err(WriteError::LengthMismatch {
            visibilities: visibilities.len(),
            samples: samples.len(),
        });
    }

    let file = &config.vis_file;
    let f = File::create(file).map_err(|err| WriteError::Create {
        file: file.display().to_string(),
        err,
    })?;
    if config.enable_messages {
        info!("Writing visibilities to {}", file.display());
    }
    let mut f = BufWriter::new(f);

    let scale = config.wavelength_to_metres();
    debug!("Scaling uvw back to wavelengths by 1/{scale}");
    writeln!(f, "{}", visibilities.len())?;
    for (vis, sample) in visibilities.iter().zip(samples) {
        writeln!(
            f,
            "{} {} {} {:.6} {:.6} {:.6}",
            vis.u / scale,
            vis.v / scale,
            vis.w / scale,
            sample.real,
            sample.imaginary,
            1.0
        )?;
    }
    f.flush()?;

    if config.enable_messages {
        info!("Completed writing of visibilities to file");
    }
    Ok(())
}
