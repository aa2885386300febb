// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The records that flow through the DFT. All of them are `#[repr(C)]` and
//! [`bytemuck::Pod`] so that they can be handed to a device verbatim; the
//! layouts must match the structs declared by the device kernel.


use bytemuck::{Pod, Zeroable};
use num_complex::Complex;

/// A point of sky brightness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Source {
    /// Direction-cosine offset from the phase-tracking centre.
    pub l: f64,
    /// Direction-cosine offset from the phase-tracking centre.
    pub m: f64,
    /// May be negative.
    pub intensity: f64,
}

/// One interferometric baseline sample. By the time this reaches
/// [`crate::compute`], the coordinates are in metres (wavelengths scaled by
/// `frequency / c`) or normalised synthetic units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Visibility {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

/// The complex value observed for a single [`Visibility`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ComplexSample {
    pub real: f64,
    pub imaginary: f64,
}

static_assertions::const_assert_eq!(std::mem::size_of::<Source>(), 24);
static_assertions::const_assert_eq!(std::mem::size_of::<Visibility>(), 24);
static_assertions::const_assert_eq!(std::mem::size_of::<ComplexSample>(), 16);

impl ComplexSample {
    /// The Euclidean distance between two samples in the complex plane.
    pub fn distance(self, other: ComplexSample) -> f64 {
        (Complex::from(self) - Complex::from(other)).norm()
    }
}

impl From<ComplexSample> for Complex<f64> {
    fn from(s: ComplexSample) -> Self {
        Complex::new(s.real, s.imaginary)
    }
}

impl From<Complex<f64>> for ComplexSample {
    fn from(c: Complex<f64>) -> Self {
        ComplexSample {
            real: c.re,
            imaginary: c.im,
        }
    }
}

/// Visibilities and the complex samples that belong to them. Both vectors
/// always have the same length; this is why the fields are private.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilitySet {
    visibilities: Vec<Visibility>,
    samples: Vec<ComplexSample>,
}

impl VisibilitySet {
    /// Pair up visibilities with their samples. Only the loader builds
    /// these, and it always allocates one sample per visibility.
    pub(crate) fn new(visibilities: Vec<Visibility>, samples: Vec<ComplexSample>) -> VisibilitySet {
        assert_eq!(
            visibilities.len(),
            samples.len(),
            "visibilities.len() != samples.len()"
        );
        VisibilitySet {
            visibilities,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.visibilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visibilities.is_empty()
    }

    pub fn visibilities(&self) -> &[Visibility] {
        &self.visibilities
    }

    pub fn samples(&self) -> &[ComplexSample] {
        &self.samples
    }

    /// Borrow the (frozen) visibilities alongside the samples, so that the
    /// samples can be written by [`crate::compute`].
    pub fn split_mut(&mut self) -> (&[Visibility], &mut [ComplexSample]) {
        (&self.visibilities, &mut self.samples)
    }

    pub fn into_parts(self) -> (Vec<Visibility>, Vec<ComplexSample>) {
        (self.visibilities, self.samples)
    }
}
