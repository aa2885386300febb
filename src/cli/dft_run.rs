// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compute visibilities from a sky model with a direct Fourier transform.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};

use super::{
    printers::{display_warnings, InfoPrinter, Warn},
    DftCliError,
};
use crate::{
    compute, load_sources, load_visibilities, save_visibilities, Config, ConfigFile, DftRng,
};

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct DftRunArgs {
    /// All of the arguments to dft-run may be specified in a toml or json
    /// file. Any CLI arguments override parameters set in the file.
    #[clap(name = "ARGUMENTS_FILE", parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(super) config_args: ConfigFile,
}

impl DftRunArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single [`ConfigFile`], preferring the command line.
    pub(super) fn merge(self) -> Result<ConfigFile, DftCliError> {
        match self.args_file {
            Some(arg_file) => {
                debug!("Merging command-line arguments with the argument file");
                Ok(self.config_args.merge(ConfigFile::read(arg_file)?))
            }
            None => Ok(self.config_args),
        }
    }
}

/// Defer warnings about arguments that have no effect with the given
/// combination of data sources.
fn warn_about_ignored_args(args: &ConfigFile) {
    if args.num_sources.is_some() && !args.synthetic_sources {
        "--num-sources has no effect when reading sources from a file".warn();
    }
    if args.num_visibilities.is_some() && !args.synthetic_visibilities {
        "--num-visibilities has no effect when reading visibilities from a file".warn();
    }
    if args.gaussian && !args.synthetic_visibilities {
        "--gaussian only applies to synthetic visibilities".warn();
    }
    if args.force_zero_w && args.synthetic_visibilities {
        "--force-zero-w only applies to visibilities read from a file".warn();
    }
}

pub(super) fn run(args: ConfigFile, dry_run: bool) -> Result<(), DftCliError> {
    debug!("Converting arguments into parameters");
    trace!("{args:#?}");
    warn_about_ignored_args(&args);
    let mut config = Config::default().apply(args)?;
    let device_info = config.device.get_device_info()?;

    let mut rng = DftRng::new(config.seed);
    let sources = load_sources(&mut config, &mut rng)
        .map_err(|e| DftCliError::SourceLoad(e.to_string()))?;
    let mut vis_set = load_visibilities(&mut config, &mut rng)
        .map_err(|e| DftCliError::VisibilityLoad(e.to_string()))?;

    display_run_summary(&config, &device_info);
    display_warnings();

    if dry_run {
        info!("Dry run -- exiting now.");
        return Ok(());
    }

    let (visibilities, samples) = vis_set.split_mut();
    compute(&config, &sources, visibilities, samples)?;
    save_visibilities(&config, vis_set.visibilities(), vis_set.samples())?;
    if config.enable_messages {
        info!(
            "Wrote {} visibilities to {}",
            vis_set.len(),
            config.vis_file.display()
        );
    }

    Ok(())
}

fn display_run_summary(config: &Config, device_info: &str) {
    let mut printer = InfoPrinter::new("DFT set up".into());
    printer.push_line(format!("Using the {}: {device_info}", config.device).into());

    let sources = if config.synthetic_sources {
        format!("{} synthetic sources", config.num_sources)
    } else {
        format!(
            "{} sources from {}",
            config.num_sources,
            config.source_file.display()
        )
    };
    let visibilities = if config.synthetic_visibilities {
        let distribution = if config.gaussian_distribution_sources {
            "gaussian-scaled"
        } else {
            "uniform"
        };
        format!(
            "{} synthetic visibilities ({distribution})",
            config.num_visibilities
        )
    } else {
        let zero_w = if config.force_zero_w_term {
            ", w forced to zero"
        } else {
            ""
        };
        format!(
            "{} visibilities from {}{zero_w}",
            config.num_visibilities,
            config.vis_src_file.display()
        )
    };
    printer.push_block(vec![sources.into(), visibilities.into()]);

    printer.push_block(vec![
        format!(
            "Grid size: {} cells, cell size: {:e} rad",
            config.grid_size(),
            config.cell_size()
        )
        .into(),
        format!("uv scale: {}", config.uv_scale()).into(),
        format!("Frequency: {} MHz", config.frequency_hz / 1e6).into(),
    ]);
    printer.push_line(format!("Output: {}", config.vis_file.display()).into());
    printer.display();
}
