// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DftError {
    #[error("Got {visibilities} visibilities but an output buffer of {samples} complex samples")]
    LengthMismatch { visibilities: usize, samples: usize },

    #[cfg(feature = "gpu")]
    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[cfg(not(feature = "gpu"))]
    #[error("The GPU was requested, but this binary was not compiled with the \"gpu\" feature")]
    GpuUnavailable,
}

#[cfg(feature = "gpu")]
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No GPU or CPU device with f64 shader support was found")]
    NoDevice,

    #[error("Couldn't create an execution context: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Couldn't read the kernel source {file}: {err}")]
    KernelFile { file: String, err: std::io::Error },

    #[error("Couldn't compile the DFT kernel:\n{0}")]
    KernelCompile(String),

    #[error("Couldn't create the DFT kernel pipeline:\n{0}")]
    Pipeline(String),

    #[error("Too many {what} for the device ({count})")]
    TooMany { what: &'static str, count: usize },

    #[error("Couldn't map the output buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("{file}:{line}: Couldn't copy the output back to the host: {msg}")]
    Readback {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },
}
