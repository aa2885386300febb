// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to compute visibilities from point sources with a direct Fourier
//! transform.
//!
//! For each visibility `(u, v, w)`, the complex sample is
//!
//! `V = Σ_s I_s exp(-2πi (u l_s + v m_s + w (n_s - 1)))`, with
//! `n_s = sqrt(1 - l_s² - m_s²)`.
//!
//! There is no `1/n` normalisation of the source intensity.

mod cpu;
mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(test)]
mod tests;

pub use error::DftError;
#[cfg(feature = "gpu")]
pub use error::GpuError;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    config::Config,
    data::{ComplexSample, Source, Visibility},
    PROGRESS_BARS,
};

/// The number of invocations in a device workgroup. This must match the
/// `@workgroup_size` of the kernel.
pub const WORKGROUP_SIZE: u32 = 64;

/// What computes the DFT.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DftDevice {
    /// The host CPU (with rayon). This is always available.
    Cpu,

    /// A GPU-class wgpu adapter with f64 shader support, falling back to a
    /// CPU-class adapter. Only usable when compiled with the "gpu" feature.
    Gpu,
}

/// The GPU when compiled with the "gpu" feature, otherwise the CPU.
impl Default for DftDevice {
    fn default() -> Self {
        #[cfg(feature = "gpu")]
        {
            DftDevice::Gpu
        }

        #[cfg(not(feature = "gpu"))]
        {
            DftDevice::Cpu
        }
    }
}

impl DftDevice {
    /// Get a formatted string with information on the device.
    pub fn get_device_info(self) -> Result<String, DftError> {
        match self {
            DftDevice::Cpu => Ok(get_cpu_info()),

            #[cfg(feature = "gpu")]
            DftDevice::Gpu => Ok(gpu::get_device_info()?),

            #[cfg(not(feature = "gpu"))]
            DftDevice::Gpu => Err(DftError::GpuUnavailable),
        }
    }
}

/// Get a formatted string with information on the host CPU.
pub(crate) fn get_cpu_info() -> String {
    let threads = rayon::current_num_threads();

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        let avx2 = std::arch::is_x86_feature_detected!("avx2");
        let avx = std::arch::is_x86_feature_detected!("avx");
        let simd = match (avx2, avx) {
            (true, _) => "AVX2 available",
            (false, true) => "AVX available",
            (false, false) => "AVX unavailable",
        };
        format!("{} CPU ({simd}), {threads} threads", std::env::consts::ARCH)
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    format!("{} CPU, {threads} threads", std::env::consts::ARCH)
}

/// How a kernel parameter is bound on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamAccess {
    /// A storage buffer the kernel only reads.
    Read,
    /// A storage buffer the kernel writes.
    ReadWrite,
    /// A scalar uniform.
    Uniform,
}

/// The parameters of the device kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum KernelParam {
    Visibilities,
    Output,
    VisibilityCount,
    Sources,
    SourceCount,
}

impl KernelParam {
    pub fn access(self) -> ParamAccess {
        match self {
            KernelParam::Visibilities | KernelParam::Sources => ParamAccess::Read,
            KernelParam::Output => ParamAccess::ReadWrite,
            KernelParam::VisibilityCount | KernelParam::SourceCount => ParamAccess::Uniform,
        }
    }
}

/// The kernel parameters in binding order; a parameter's binding index is its
/// index in this array.
pub const KERNEL_PARAMS: [KernelParam; 5] = [
    KernelParam::Visibilities,
    KernelParam::Output,
    KernelParam::VisibilityCount,
    KernelParam::Sources,
    KernelParam::SourceCount,
];

/// Compute the DFT of `sources` for each of `visibilities`, overwriting
/// `samples` (which must be as long as `visibilities`). The device used is
/// [`Config::device`].
pub fn compute(
    config: &Config,
    sources: &[Source],
    visibilities: &[Visibility],
    samples: &mut [ComplexSample],
) -> Result<(), DftError> {
    if visibilities.len() != samples.len() {
        return Err(DftError::LengthMismatch {
            visibilities: visibilities.len(),
            samples: samples.len(),
        });
    }
    if visibilities.is_empty() {
        debug!("No visibilities; not running the DFT");
        return Ok(());
    }
    debug!(
        "Running the DFT on the {} with {} sources and {} visibilities",
        config.device,
        sources.len(),
        visibilities.len()
    );

    match config.device {
        DftDevice::Cpu => {
            let progress = make_progress_bar(config, visibilities.len());
            cpu::dft(sources, visibilities, samples, progress.clone());
            progress.finish_and_clear();
            if config.enable_messages {
                info!("DFT completed");
            }
            Ok(())
        }

        #[cfg(feature = "gpu")]
        DftDevice::Gpu => {
            gpu::dft(config, sources, visibilities, samples)?;
            Ok(())
        }

        #[cfg(not(feature = "gpu"))]
        DftDevice::Gpu => Err(DftError::GpuUnavailable),
    }
}

fn make_progress_bar(config: &Config, len: usize) -> ProgressBar {
    let draw_target = if config.enable_messages && PROGRESS_BARS.load() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    };
    ProgressBar::with_draw_target(Some(len as u64), draw_target)
        .with_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg:17}: [{wide_bar:.blue}] {pos}/{len} visibilities ({elapsed_precise}<{eta_precise})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        )
        .with_message("DFT")
}
