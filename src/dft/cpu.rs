// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The DFT on the host.

use std::f64::consts::TAU;

use indicatif::{ParallelProgressIterator, ProgressBar};
use num_complex::Complex;
use rayon::prelude::*;

use crate::data::{ComplexSample, Source, Visibility};

/// Overwrite each sample with the DFT of all sources at its visibility. One
/// parallel item per visibility.
pub(super) fn dft(
    sources: &[Source],
    visibilities: &[Visibility],
    samples: &mut [ComplexSample],
    progress: ProgressBar,
) {
    samples
        .par_iter_mut()
        .zip(visibilities.par_iter())
        .progress_with(progress)
        .for_each(|(sample, vis)| *sample = dft_one(sources, *vis));
}

pub(super) fn dft_one(sources: &[Source], vis: Visibility) -> ComplexSample {
    sources
        .iter()
        .map(|source| {
            let n = (1.0 - source.l * source.l - source.m * source.m).sqrt();
            let theta = TAU * (vis.u * source.l + vis.v * source.m + vis.w * (n - 1.0));
            let (s, c) = theta.sin_cos();
            Complex::new(source.intensity * c, -source.intensity * s)
        })
        .sum::<Complex<f64>>()
        .into()
}
