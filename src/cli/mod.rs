// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. More specific options for `direct_dft`
//! subcommands are contained in modules.
//!
//! Only 3 things should be public in this module: `DftCli`, `DftCli::run`,
//! and `DftCliError`.

mod dft_run;
mod error;
mod printers;
mod validate;

pub use error::DftCliError;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use crate::PROGRESS_BARS;

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Direct (non-FFT) Fourier transform of point-source sky models into visibilities"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
pub struct DftCli {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Don't draw progress bars.
    #[clap(long)]
    #[clap(global = true)]
    no_progress_bars: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Only load the inputs and print out high-level information; don't run
    /// the DFT.
    #[clap(long)]
    #[clap(global = true)]
    dry_run: bool,

    /// Save the input arguments into a new TOML file that can be used to
    /// reproduce this run.
    #[clap(long)]
    #[clap(global = true)]
    save_toml: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "run")]
    #[clap(about = "Load sources and visibilities, compute the DFT and save the results.")]
    DftRun(dft_run::DftRunArgs),

    #[clap(about = "Compare the DFT against a reference dataset.")]
    Validate(validate::ValidateArgs),

    #[clap(about = "List the devices that can compute the DFT.")]
    Devices,
}

impl DftCli {
    pub fn run(self) -> Result<(), DftCliError> {
        let GlobalArgs {
            verbosity,
            dry_run,
            no_progress_bars,
            save_toml,
        } = self.global_opts;
        setup_logging(verbosity)
            .map_err(|e| DftCliError::Generic(format!("Failed to initialise logging: {e}")))?;
        // Enable progress bars if the user didn't say "no progress bars".
        if !no_progress_bars {
            PROGRESS_BARS.store(true);
        }

        let sub_command = match &self.command {
            Command::DftRun(_) => "dft-run",
            Command::Validate(_) => "validate",
            Command::Devices => "devices",
        };
        info!("direct_dft {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        match self.command {
            Command::DftRun(args) => {
                let args = args.merge()?;
                if let Some(toml) = save_toml {
                    save_args(&toml, &args)?;
                }
                dft_run::run(args, dry_run)?;
            }

            Command::Validate(args) => {
                let args = args.merge()?;
                if let Some(toml) = save_toml {
                    save_args(&toml, &args.config_args)?;
                }
                args.run(dry_run)?;
            }

            Command::Devices => list_devices(),
        }

        info!("direct_dft {} complete.", sub_command);
        Ok(())
    }
}

/// Write `args` out as TOML, so that they can be given back as an arguments
/// file.
fn save_args<T: Serialize>(toml: &Path, args: &T) -> Result<(), DftCliError> {
    let toml_str = toml::to_string(args)
        .map_err(|e| DftCliError::Generic(format!("Couldn't serialise arguments to toml: {e}")))?;
    let mut f = BufWriter::new(File::create(toml)?);
    f.write_all(toml_str.as_bytes())?;
    f.flush()?;
    Ok(())
}

fn list_devices() {
    let mut printer = printers::InfoPrinter::new("Available devices".into());
    printer.push_line(format!("cpu: {}", crate::dft::get_cpu_info()).into());

    #[cfg(feature = "gpu")]
    {
        let (adapters, selected) = crate::dft::gpu::list_adapters();
        if adapters.is_empty() {
            printer.push_line("gpu: no adapters found".into());
        } else {
            let block = adapters
                .iter()
                .enumerate()
                .map(|(i, adapter)| {
                    let marker = if selected == Some(i) { " (selected)" } else { "" };
                    format!("gpu {i}: {adapter}{marker}").into()
                })
                .collect();
            printer.push_block(block);
        }
        if selected.is_none() {
            printer.push_line("No adapter supports f64 shaders; --device gpu will fail".into());
        }
    }

    #[cfg(not(feature = "gpu"))]
    printer.push_line(
        format!(
            "{}: not available; compile with the \"gpu\" feature",
            crate::DftDevice::Gpu
        )
        .into(),
    );

    printer.display();
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
