// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Direct (brute-force, non-FFT) Fourier transform of point-source sky models
//! into interferometric visibilities. This is a reference implementation, used
//! to validate faster gridding/FFT-based pipelines.

mod cli;
mod config;
mod constants;
mod data;
mod dft;
mod io;
mod random;
mod validation;

// Re-exports.
pub use cli::{DftCli, DftCliError};
pub use config::{Config, ConfigError, ConfigFile};
pub use constants::*;
pub use data::{ComplexSample, Source, Visibility, VisibilitySet};
pub use dft::{
    compute, DftDevice, DftError, KernelParam, ParamAccess, KERNEL_PARAMS, WORKGROUP_SIZE,
};
#[cfg(feature = "gpu")]
pub use dft::{
    gpu::{list_adapters, AdapterSummary, DeviceResources},
    GpuError,
};
pub use io::{
    read::{load_sources, load_visibilities, ReadError},
    write::{save_visibilities, WriteError},
};
pub use random::DftRng;
pub use validation::{check_tolerance, max_difference, run_unit_test, ValidationError};

use crossbeam_utils::atomic::AtomicCell;

/// Are progress bars being drawn? This should only ever be enabled by CLI code.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
