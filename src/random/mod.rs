// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scalar random draws for synthetic data.
//!
//! The stream is an explicit object rather than process-wide state; callers
//! that need reproducible data seed it with [`DftRng::from_seed`].

#[cfg(test)]
mod tests;

use std::time::{SystemTime, UNIX_EPOCH};

use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// The number of distinct raw integer draws used by [`DftRng::uniform`].
const RANGE: f64 = (1_u64 << RAW_BITS) as f64;
const RAW_BITS: u32 = 53;

pub struct DftRng {
    rng: StdRng,
}

impl DftRng {
    /// Seed the stream from the wall clock.
    pub fn from_time() -> DftRng {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        trace!("Seeding the random stream with {seed}");
        DftRng::from_seed(seed)
    }

    pub fn from_seed(seed: u64) -> DftRng {
        DftRng {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from `seed` if it is available, otherwise from the clock.
    pub fn new(seed: Option<u64>) -> DftRng {
        match seed {
            Some(s) => DftRng::from_seed(s),
            None => DftRng::from_time(),
        }
    }

    /// A raw integer draw in `[0, RANGE)`.
    fn raw(&mut self) -> f64 {
        (self.rng.gen::<u64>() >> (64 - RAW_BITS)) as f64
    }

    /// A draw in `[0, 1)`.
    fn raw01(&mut self) -> f64 {
        self.raw() / RANGE
    }

    /// A draw in `[min, max)`, computed as `min + raw / (RANGE / (max - min))`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        let div = RANGE / (max - min);
        min + self.raw() / div
    }

    /// Polar-method draw, returning `u * v * c` rather than `u * c`. Draws
    /// whose magnitude exceeds 1 are rejected, so the result always lies in
    /// `[-1, 1]`, with a mean of 0 and a variance just under 1/16.
    pub fn gaussian(&mut self) -> f64 {
        loop {
            let u = self.raw01() * 2.0 - 1.0;
            let v = self.raw01() * 2.0 - 1.0;
            let r = u * u + v * v;
            if r <= 0.0 || r > 1.0 {
                continue;
            }
            let c = (-2.0 * r.ln() / r).sqrt();
            let x = u * v * c;
            if !(-1.0..=1.0).contains(&x) {
                continue;
            }
            return x;
        }
    }
}
