// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compare the DFT against a reference dataset.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use super::{printers::InfoPrinter, DftCliError};
use crate::{
    validation::check_tolerance, run_unit_test, Config, ConfigFile,
    DEFAULT_VALIDATION_TOLERANCE,
};

#[derive(Parser, Debug, Clone)]
pub(super) struct ValidateArgs {
    /// All of the arguments to validate may be specified in a toml or json
    /// file. Any CLI arguments override parameters set in the file. The
    /// sources are read from --source-file and the reference visibilities
    /// (with their expected values) from --input-vis.
    #[clap(name = "ARGUMENTS_FILE", parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(super) config_args: ConfigFile,

    /// The largest allowed distance between a computed and a reference
    /// visibility.
    #[clap(long, default_value_t = DEFAULT_VALIDATION_TOLERANCE)]
    pub(super) tolerance: f64,
}

impl ValidateArgs {
    /// Consolidate the command-line and file arguments, preferring the
    /// command line.
    pub(super) fn merge(self) -> Result<ValidateArgs, DftCliError> {
        match self.args_file {
            Some(arg_file) => {
                debug!("Merging command-line arguments with the argument file");
                Ok(ValidateArgs {
                    args_file: None,
                    config_args: self.config_args.merge(ConfigFile::read(arg_file)?),
                    tolerance: self.tolerance,
                })
            }
            None => Ok(self),
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), DftCliError> {
        let ValidateArgs {
            args_file: _,
            config_args,
            tolerance,
        } = self;
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(DftCliError::ArgFile(format!(
                "The tolerance must be a non-negative number, but got {tolerance}"
            )));
        }
        let config = Config::unit_test().apply(config_args)?;

        let mut printer = InfoPrinter::new("Validating against a reference dataset".into());
        printer.push_line(format!("Using the {}", config.device).into());
        printer.push_block(vec![
            format!("Sources: {}", config.source_file.display()).into(),
            format!("Reference: {}", config.vis_src_file.display()).into(),
        ]);
        printer.push_line(format!("Tolerance: {tolerance:e}").into());
        printer.display();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let difference = run_unit_test(&config)?;
        check_tolerance(difference, tolerance)?;
        info!("Maximum difference {difference:e} is within the tolerance {tolerance:e}");
        Ok(())
    }
}
