// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

const NUM_DRAWS: usize = 100_000;

fn mean_and_variance(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

#[test]
fn test_uniform_stays_in_range() {
    let mut rng = DftRng::from_seed(1);
    for (min, max) in [(0.0, 1.0), (-512.0, 512.0), (-51.2, 51.2), (3.0, 3.5)] {
        let draws: Vec<f64> = (0..NUM_DRAWS).map(|_| rng.uniform(min, max)).collect();
        assert!(draws.iter().all(|&x| x >= min && x < max));
        let (mean, var) = mean_and_variance(&draws);
        let width = max - min;
        // The standard error of the mean is width / sqrt(12 N), ~0.001 * width.
        assert_abs_diff_eq!(mean, (min + max) / 2.0, epsilon = 0.01 * width);
        assert_abs_diff_eq!(var, width * width / 12.0, epsilon = 0.01 * width * width);
    }
}

#[test]
fn test_gaussian_distribution() {
    let mut rng = DftRng::from_seed(2);
    let draws: Vec<f64> = (0..NUM_DRAWS).map(|_| rng.gaussian()).collect();
    assert!(draws.iter().all(|x| (-1.0..=1.0).contains(x)));
    let (mean, var) = mean_and_variance(&draws);
    assert_abs_diff_eq!(mean, 0.0, epsilon = 0.01);
    assert_abs_diff_eq!(var, 0.0625, epsilon = 0.005);
    // Symmetric about zero.
    let num_positive = draws.iter().filter(|&&x| x > 0.0).count() as f64;
    assert_abs_diff_eq!(num_positive / NUM_DRAWS as f64, 0.5, epsilon = 0.01);
}

#[test]
fn test_seeded_streams_are_reproducible() {
    let mut a = DftRng::from_seed(1234);
    let mut b = DftRng::new(Some(1234));
    for _ in 0..100 {
        assert_eq!(a.uniform(-1.0, 1.0), b.uniform(-1.0, 1.0));
        assert_eq!(a.gaussian(), b.gaussian());
    }

    let mut c = DftRng::from_seed(4321);
    let mut a = DftRng::from_seed(1234);
    let same = (0..100)
        .filter(|_| a.uniform(0.0, 1.0) == c.uniform(0.0, 1.0))
        .count();
    assert!(same < 100);
}
