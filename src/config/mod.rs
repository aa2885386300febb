// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run parameters.
//!
//! A [`Config`] is constructed once per run, optionally overlaid with a
//! [`ConfigFile`] (command-line arguments and/or an arguments file), and is
//! read-only afterwards (except for the source/visibility counts, which are
//! overwritten when reading from files). The grid-derived quantities can only
//! be changed through [`Config::set_grid`], so they can never disagree with
//! the grid size and cell size.

mod error;

pub use error::ConfigError;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{constants::*, dft::DftDevice};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The number of visibilities to generate. Overwritten by the count in
    /// the input visibility file when reading from a file.
    pub num_visibilities: usize,
    /// The number of sources to generate. Overwritten by the count in the
    /// source file when reading from a file.
    pub num_sources: usize,

    /// Where sources are read from (if not synthetic).
    pub source_file: PathBuf,
    /// Where visibilities are read from (if not synthetic).
    pub vis_src_file: PathBuf,
    /// Where computed visibilities are written.
    pub vis_file: PathBuf,

    /// Disregard the visibility w coordinate of file visibilities.
    pub force_zero_w_term: bool,
    pub synthetic_sources: bool,
    pub synthetic_visibilities: bool,
    /// When generating synthetic visibilities, scale the positions by
    /// normally-distributed factors.
    pub gaussian_distribution_sources: bool,

    /// Dimension of the Fourier-domain grid \[cells\].
    pub(crate) grid_size: f64,
    /// Fourier-domain grid cell size \[radians\].
    pub(crate) cell_size: f64,
    pub(crate) uv_scale: f64,
    pub(crate) min_u: f64,
    pub(crate) max_u: f64,
    pub(crate) min_v: f64,
    pub(crate) max_v: f64,

    /// The frequency of the visibility uvw terms \[Hz\].
    pub frequency_hz: f64,

    /// Report progress messages.
    pub enable_messages: bool,

    /// What computes the DFT.
    pub device: DftDevice,
    /// The kernel source to compile for GPU dispatch. If this is `None`, the
    /// kernel bundled with this crate is used.
    pub kernel_file: Option<PathBuf>,
    /// Seed for synthetic data. If this is `None`, the seed is taken from the
    /// clock.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Config {
            num_visibilities: 1,
            num_sources: 1,
            source_file: PathBuf::from("500_synthetic_sources.csv"),
            vis_src_file: PathBuf::from("sample_10k_vis_input.csv"),
            vis_file: PathBuf::from("DFT_visibilities.txt"),
            force_zero_w_term: false,
            synthetic_sources: false,
            synthetic_visibilities: false,
            gaussian_distribution_sources: false,
            grid_size: 0.0,
            cell_size: 0.0,
            uv_scale: 0.0,
            min_u: 0.0,
            max_u: 0.0,
            min_v: 0.0,
            max_v: 0.0,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            enable_messages: true,
            device: DftDevice::default(),
            kernel_file: None,
            seed: None,
        };
        config.set_grid(DEFAULT_GRID_SIZE, DEFAULT_CELL_SIZE);
        config
    }
}

impl Config {
    /// Fixed, well-known values used to compare against the reference
    /// dataset in `test_files`.
    pub fn unit_test() -> Config {
        Config {
            source_file: PathBuf::from("test_files/unit_test_sources.txt"),
            vis_src_file: PathBuf::from("test_files/unit_test_visibilities.txt"),
            vis_file: PathBuf::from("test_files/unit_test_vis_output.txt"),
            enable_messages: false,
            ..Default::default()
        }
    }

    /// Set the grid geometry, recomputing everything derived from it.
    pub fn set_grid(&mut self, grid_size: f64, cell_size: f64) {
        self.grid_size = grid_size;
        self.cell_size = cell_size;
        self.uv_scale = grid_size * cell_size;
        self.min_u = -(grid_size / 2.0);
        self.max_u = grid_size / 2.0;
        self.min_v = -(grid_size / 2.0);
        self.max_v = grid_size / 2.0;
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// `grid_size * cell_size`.
    pub fn uv_scale(&self) -> f64 {
        self.uv_scale
    }

    pub fn min_u(&self) -> f64 {
        self.min_u
    }

    pub fn max_u(&self) -> f64 {
        self.max_u
    }

    pub fn min_v(&self) -> f64 {
        self.min_v
    }

    pub fn max_v(&self) -> f64 {
        self.max_v
    }

    /// The scalar that converts file uvw coordinates \[wavelengths\] into
    /// the units used for the DFT.
    pub fn wavelength_to_metres(&self) -> f64 {
        self.frequency_hz / VEL_C
    }

    /// Overlay the parameters that were specified in `file` on top of this
    /// config. Derived grid quantities are recomputed.
    pub fn apply(mut self, file: ConfigFile) -> Result<Config, ConfigError> {
        // Expose all the struct fields to ensure they're all used.
        let ConfigFile {
            num_sources,
            num_visibilities,
            synthetic_sources,
            synthetic_visibilities,
            gaussian,
            force_zero_w,
            source_file,
            input_vis,
            output_vis,
            grid_size,
            cell_size,
            frequency_hz,
            quiet,
            device,
            kernel_file,
            seed,
        } = file;

        if let Some(n) = num_sources {
            self.num_sources = n;
        }
        if let Some(n) = num_visibilities {
            self.num_visibilities = n;
        }
        self.synthetic_sources |= synthetic_sources;
        self.synthetic_visibilities |= synthetic_visibilities;
        self.gaussian_distribution_sources |= gaussian;
        self.force_zero_w_term |= force_zero_w;
        if let Some(f) = source_file {
            self.source_file = f;
        }
        if let Some(f) = input_vis {
            self.vis_src_file = f;
        }
        if let Some(f) = output_vis {
            self.vis_file = f;
        }

        let grid_size = grid_size.unwrap_or(self.grid_size);
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return Err(ConfigError::InvalidGridSize(grid_size));
        }
        let cell_size = cell_size.unwrap_or(self.cell_size);
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        self.set_grid(grid_size, cell_size);

        if let Some(f) = frequency_hz {
            if !(f.is_finite() && f > 0.0) {
                return Err(ConfigError::InvalidFrequency(f));
            }
            self.frequency_hz = f;
        }
        if quiet {
            self.enable_messages = false;
        }
        if let Some(d) = device {
            self.device = d;
        }
        if kernel_file.is_some() {
            self.kernel_file = kernel_file;
        }
        if seed.is_some() {
            self.seed = seed;
        }

        Ok(self)
    }
}

lazy_static::lazy_static! {
    pub(crate) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(crate) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Run parameters that may be specified on the command line or in an
/// arguments file. Anything not specified keeps the value of the [`Config`]
/// it is applied to.
///
/// All booleans must have `#[serde(default)]` annotated, and anything that
/// isn't a boolean must be optional.
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// The number of synthetic sources to generate. Ignored when reading
    /// sources from a file.
    #[clap(long, help_heading = "SOURCES")]
    pub num_sources: Option<usize>,

    /// The number of synthetic visibilities to generate. Ignored when reading
    /// visibilities from a file.
    #[clap(long, help_heading = "VISIBILITIES")]
    pub num_visibilities: Option<usize>,

    /// Generate sources randomly rather than reading them from a file.
    #[clap(long, help_heading = "SOURCES")]
    #[serde(default)]
    pub synthetic_sources: bool,

    /// Generate visibilities randomly rather than reading them from a file.
    #[clap(long, help_heading = "VISIBILITIES")]
    #[serde(default)]
    pub synthetic_visibilities: bool,

    /// Scale synthetic visibility positions by normally-distributed factors.
    #[clap(long, help_heading = "VISIBILITIES")]
    #[serde(default)]
    pub gaussian: bool,

    /// Disregard the w coordinate of visibilities read from a file.
    #[clap(long, help_heading = "VISIBILITIES")]
    #[serde(default)]
    pub force_zero_w: bool,

    /// Path to the source file.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub source_file: Option<PathBuf>,

    /// Path to the input visibility file.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub input_vis: Option<PathBuf>,

    /// Path to the output visibility file.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub output_vis: Option<PathBuf>,

    /// Dimension of the Fourier-domain grid [cells].
    #[clap(long, help_heading = "GRID")]
    pub grid_size: Option<f64>,

    /// Fourier-domain grid cell size [radians].
    #[clap(long, help_heading = "GRID")]
    pub cell_size: Option<f64>,

    /// The frequency of the visibility uvw terms [Hz].
    #[clap(short, long, help_heading = "GRID")]
    pub frequency_hz: Option<f64>,

    /// Don't report progress messages.
    #[clap(short, long)]
    #[serde(default)]
    pub quiet: bool,

    /// What computes the DFT. Valid values are "cpu" and "gpu"; "gpu" is only
    /// available (and is the default) if compiled with the "gpu" feature.
    #[clap(short, long, help_heading = "DEVICE")]
    pub device: Option<DftDevice>,

    /// Compile this kernel source rather than the bundled kernel when using
    /// the GPU.
    #[clap(long, parse(from_os_str), help_heading = "DEVICE")]
    pub kernel_file: Option<PathBuf>,

    /// Seed for generating synthetic sources and visibilities.
    #[clap(long)]
    pub seed: Option<u64>,
}

impl ConfigFile {
    /// Read parameters from a toml or json file, chosen by the file
    /// extension.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<ConfigFile, ConfigError> {
        let file = file.as_ref();
        debug!("Attempting to parse argument file {}", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        let mut contents = String::new();
        match file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                File::open(file)?.read_to_string(&mut contents)?;
                toml::from_str(&contents).map_err(|e| ConfigError::Decode {
                    file: file.display().to_string(),
                    err: e.to_string(),
                })
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                File::open(file)?.read_to_string(&mut contents)?;
                serde_json::from_str(&contents).map_err(|e| ConfigError::Decode {
                    file: file.display().to_string(),
                    err: e.to_string(),
                })
            }
            None => Err(ConfigError::UnrecognisedExtension {
                file: file.display().to_string(),
                valid: ARG_FILE_TYPES_COMMA_SEPARATED.as_str(),
            }),
        }
    }

    /// Consolidate two sets of parameters, preferring those in `self`.
    pub fn merge(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            num_sources: self.num_sources.or(other.num_sources),
            num_visibilities: self.num_visibilities.or(other.num_visibilities),
            synthetic_sources: self.synthetic_sources || other.synthetic_sources,
            synthetic_visibilities: self.synthetic_visibilities || other.synthetic_visibilities,
            gaussian: self.gaussian || other.gaussian,
            force_zero_w: self.force_zero_w || other.force_zero_w,
            source_file: self.source_file.or(other.source_file),
            input_vis: self.input_vis.or(other.input_vis),
            output_vis: self.output_vis.or(other.output_vis),
            grid_size: self.grid_size.or(other.grid_size),
            cell_size: self.cell_size.or(other.cell_size),
            frequency_hz: self.frequency_hz.or(other.frequency_hz),
            quiet: self.quiet || other.quiet,
            device: self.device.or(other.device),
            kernel_file: self.kernel_file.or(other.kernel_file),
            seed: self.seed.or(other.seed),
        }
    }
}
