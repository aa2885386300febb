// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Comparison of computed visibilities against a reference dataset.

mod error;

pub use error::ValidationError;

use std::path::Path;

use log::{debug, info};

use crate::{
    config::Config,
    data::{ComplexSample, Source, Visibility},
    dft::compute,
    io::read::{load_sources, RecordReader},
    random::DftRng,
};

/// Compute each visibility of the `reference` file (one at a time) from
/// `sources`, and return the maximum distance between the computed and
/// reference samples. The file has the same layout as an input visibility
/// file; the w terms are always used.
pub fn max_difference(
    config: &Config,
    sources: &[Source],
    reference: &Path,
) -> Result<f64, ValidationError> {
    let mut reader = RecordReader::open(reference)?;
    let count = reader.count()?;
    debug!(
        "Validating {count} visibilities from {} against {} sources",
        reference.display(),
        sources.len()
    );

    let scale = config.wavelength_to_metres();
    let mut difference: f64 = 0.0;
    for i in 0..count {
        let [u, v, w, real, imaginary, _intensity] = reader
            .record::<6>()?
            .ok_or_else(|| reader.truncated(count, i))?;
        let vis = Visibility {
            u: u * scale,
            v: v * scale,
            w: w * scale,
        };
        let expected = ComplexSample { real, imaginary };

        let mut computed = [ComplexSample::default()];
        compute(config, sources, &[vis], &mut computed)?;
        difference = difference.max(computed[0].distance(expected));
    }

    info!("Measured maximum difference of evaluated visibilities is {difference:e}");
    Ok(difference)
}

/// Load the sources named by `config` and validate against its input
/// visibility file. `config` is usually [`Config::unit_test`].
pub fn run_unit_test(config: &Config) -> Result<f64, ValidationError> {
    let mut config = config.clone();
    let mut rng = DftRng::new(config.seed);
    let sources = load_sources(&mut config, &mut rng)?;
    max_difference(&config, &sources, &config.vis_src_file)
}

/// Fail if `difference` is greater than `tolerance`.
pub fn check_tolerance(difference: f64, tolerance: f64) -> Result<(), ValidationError> {
    if difference > tolerance || difference.is_nan() {
        Err(ValidationError::ToleranceExceeded {
            difference,
            tolerance,
        })
    } else {
        Ok(())
    }
}
