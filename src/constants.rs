// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// The default dimension of the Fourier-domain grid \[cells\].
pub const DEFAULT_GRID_SIZE: f64 = 1024.0;

/// The default Fourier-domain grid cell size (one arcsecond) \[radians\].
pub const DEFAULT_CELL_SIZE: f64 = 4.848136811095360e-06;

/// The default observing frequency \[Hz\].
pub const DEFAULT_FREQUENCY_HZ: f64 = 300_000_000.0;

/// The maximum allowed difference between computed and reference visibilities
/// when validating.
pub const DEFAULT_VALIDATION_TOLERANCE: f64 = 1e-5;
