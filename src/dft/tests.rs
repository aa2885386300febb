// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use approx::assert_abs_diff_eq;
use num_complex::Complex;

use super::*;
use crate::random::DftRng;

fn cpu_config() -> Config {
    Config {
        enable_messages: false,
        device: DftDevice::Cpu,
        ..Default::default()
    }
}

fn random_inputs(num_sources: usize, num_vis: usize) -> (Vec<Source>, Vec<Visibility>) {
    let mut rng = DftRng::from_seed(10);
    let sources = (0..num_sources)
        .map(|_| Source {
            l: rng.uniform(-0.01, 0.01),
            m: rng.uniform(-0.01, 0.01),
            intensity: rng.uniform(-1.0, 2.0),
        })
        .collect();
    let visibilities = (0..num_vis)
        .map(|_| Visibility {
            u: rng.uniform(-500.0, 500.0),
            v: rng.uniform(-500.0, 500.0),
            w: rng.uniform(-50.0, 50.0),
        })
        .collect();
    (sources, visibilities)
}

#[test]
fn test_no_sources_gives_zeros() {
    let (_, visibilities) = random_inputs(0, 10);
    let mut samples = vec![
        ComplexSample {
            real: 5.0,
            imaginary: -5.0
        };
        10
    ];
    compute(&cpu_config(), &[], &visibilities, &mut samples).unwrap();
    assert!(samples.iter().all(|s| *s == ComplexSample::default()));
}

#[test]
fn test_no_visibilities_is_a_no_op() {
    let (sources, _) = random_inputs(3, 0);
    let mut samples: Vec<ComplexSample> = vec![];
    compute(&cpu_config(), &sources, &[], &mut samples).unwrap();
    assert!(samples.is_empty());
}

#[test]
fn test_source_at_phase_centre() {
    let sources = [Source {
        l: 0.0,
        m: 0.0,
        intensity: 1.0,
    }];
    let visibilities = [
        Visibility::default(),
        Visibility {
            u: 123.4,
            v: -56.7,
            w: 8.9,
        },
    ];
    let mut samples = [ComplexSample::default(); 2];
    compute(&cpu_config(), &sources, &visibilities, &mut samples).unwrap();
    for s in samples {
        assert_abs_diff_eq!(s.real, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.imaginary, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_phase_convention() {
    // A quarter turn of phase: exp(-i pi/2) = -i.
    let sources = [Source {
        l: 0.25,
        m: 0.0,
        intensity: 2.0,
    }];
    let visibilities = [Visibility {
        u: 1.0,
        v: 0.0,
        w: 0.0,
    }];
    let mut samples = [ComplexSample::default()];
    compute(&cpu_config(), &sources, &visibilities, &mut samples).unwrap();
    assert_abs_diff_eq!(samples[0].real, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(samples[0].imaginary, -2.0, epsilon = 1e-12);

    // The w term uses n - 1.
    let sources = [Source {
        l: 0.6,
        m: 0.0,
        intensity: 1.0,
    }];
    let visibilities = [Visibility {
        u: 0.0,
        v: 0.0,
        w: 1.25,
    }];
    compute(&cpu_config(), &sources, &visibilities, &mut samples).unwrap();
    // n = 0.8, so theta = 2 pi * 1.25 * -0.2 = -pi/2.
    assert_abs_diff_eq!(samples[0].real, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(samples[0].imaginary, 1.0, epsilon = 1e-12);
}

#[test]
fn test_dft_is_linear_in_sources() {
    let (sources, visibilities) = random_inputs(20, 50);
    let config = cpu_config();

    let mut all = vec![ComplexSample::default(); 50];
    compute(&config, &sources, &visibilities, &mut all).unwrap();

    let mut summed = vec![Complex::default(); 50];
    for source in &sources {
        let mut one = vec![ComplexSample::default(); 50];
        compute(&config, &[*source], &visibilities, &mut one).unwrap();
        for (sum, s) in summed.iter_mut().zip(one) {
            *sum += Complex::from(s);
        }
    }
    for (a, b) in all.into_iter().zip(summed) {
        assert_abs_diff_eq!(a.real, b.re, epsilon = 1e-10);
        assert_abs_diff_eq!(a.imaginary, b.im, epsilon = 1e-10);
    }
}

#[test]
fn test_negated_baseline_gives_conjugate() {
    let (sources, visibilities) = random_inputs(10, 20);
    let negated: Vec<Visibility> = visibilities
        .iter()
        .map(|v| Visibility {
            u: -v.u,
            v: -v.v,
            w: -v.w,
        })
        .collect();
    let config = cpu_config();
    let mut a = vec![ComplexSample::default(); 20];
    let mut b = vec![ComplexSample::default(); 20];
    compute(&config, &sources, &visibilities, &mut a).unwrap();
    compute(&config, &sources, &negated, &mut b).unwrap();
    for (a, b) in a.into_iter().zip(b) {
        assert_abs_diff_eq!(a.real, b.real, epsilon = 1e-10);
        assert_abs_diff_eq!(a.imaginary, -b.imaginary, epsilon = 1e-10);
    }
}

#[test]
fn test_length_mismatch_is_an_error() {
    let (sources, visibilities) = random_inputs(1, 3);
    let mut samples = vec![ComplexSample::default(); 2];
    let result = compute(&cpu_config(), &sources, &visibilities, &mut samples);
    assert!(matches!(
        result,
        Err(DftError::LengthMismatch {
            visibilities: 3,
            samples: 2
        })
    ));
}

#[test]
fn test_kernel_param_order() {
    assert_eq!(
        KERNEL_PARAMS,
        [
            KernelParam::Visibilities,
            KernelParam::Output,
            KernelParam::VisibilityCount,
            KernelParam::Sources,
            KernelParam::SourceCount,
        ]
    );
    let accesses: Vec<ParamAccess> = KERNEL_PARAMS.iter().map(|p| p.access()).collect();
    assert_eq!(
        accesses,
        [
            ParamAccess::Read,
            ParamAccess::ReadWrite,
            ParamAccess::Uniform,
            ParamAccess::Read,
            ParamAccess::Uniform,
        ]
    );
    assert_eq!(KernelParam::VisibilityCount.to_string(), "visibility_count");
}

#[test]
fn test_device_names() {
    assert_eq!(DftDevice::from_str("cpu").unwrap(), DftDevice::Cpu);
    assert_eq!(DftDevice::from_str("gpu").unwrap(), DftDevice::Gpu);
    assert!(DftDevice::from_str("tpu").is_err());
    assert_eq!(DftDevice::Cpu.to_string(), "cpu");
    assert!(DftDevice::Cpu.get_device_info().unwrap().contains("CPU"));
}

#[test]
fn test_default_device_follows_the_gpu_feature() {
    #[cfg(feature = "gpu")]
    assert_eq!(DftDevice::default(), DftDevice::Gpu);
    #[cfg(not(feature = "gpu"))]
    assert_eq!(DftDevice::default(), DftDevice::Cpu);

    assert_eq!(Config::default().device, DftDevice::default());
}

#[cfg(not(feature = "gpu"))]
#[test]
fn test_gpu_is_unavailable_without_the_feature() {
    let (sources, visibilities) = random_inputs(1, 1);
    let mut samples = vec![ComplexSample::default()];
    let config = Config {
        device: DftDevice::Gpu,
        ..cpu_config()
    };
    let result = compute(&config, &sources, &visibilities, &mut samples);
    assert!(matches!(result, Err(DftError::GpuUnavailable)));
}

#[cfg(feature = "gpu")]
mod gpu_tests {
    use serial_test::serial;

    use super::*;

    fn gpu_config() -> Config {
        Config {
            device: DftDevice::Gpu,
            ..cpu_config()
        }
    }

    /// Run on the GPU, or return `None` if no suitable device exists here.
    fn run_gpu(
        config: &Config,
        sources: &[Source],
        visibilities: &[Visibility],
    ) -> Option<Vec<ComplexSample>> {
        let mut samples = vec![ComplexSample::default(); visibilities.len()];
        match compute(config, sources, visibilities, &mut samples) {
            Ok(()) => Some(samples),
            Err(DftError::Gpu(GpuError::NoDevice)) => {
                eprintln!("No f64-capable wgpu adapter; skipping");
                None
            }
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    #[serial]
    fn test_gpu_matches_cpu() {
        let (sources, visibilities) = random_inputs(100, 1000);
        let Some(gpu) = run_gpu(&gpu_config(), &sources, &visibilities) else {
            return;
        };
        let mut cpu = vec![ComplexSample::default(); visibilities.len()];
        compute(&cpu_config(), &sources, &visibilities, &mut cpu).unwrap();
        for (g, c) in gpu.into_iter().zip(cpu) {
            assert!(g.distance(c) < 1e-6, "{g:?} != {c:?}");
        }
    }

    #[test]
    #[serial]
    fn test_gpu_no_sources_gives_zeros() {
        let (_, visibilities) = random_inputs(0, 100);
        let Some(gpu) = run_gpu(&gpu_config(), &[], &visibilities) else {
            return;
        };
        assert!(gpu.iter().all(|s| *s == ComplexSample::default()));
    }

    #[test]
    #[serial]
    fn test_bad_kernel_reports_the_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let kernel = dir.path().join("bad.wgsl");
        std::fs::write(&kernel, "fn dft_kernel( {").unwrap();
        let config = Config {
            kernel_file: Some(kernel),
            ..gpu_config()
        };
        let (sources, visibilities) = random_inputs(1, 1);
        let mut samples = vec![ComplexSample::default()];
        match compute(&config, &sources, &visibilities, &mut samples) {
            Err(DftError::Gpu(GpuError::KernelCompile(msg))) => assert!(!msg.is_empty()),
            Err(DftError::Gpu(GpuError::NoDevice)) => (),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_kernel_file() {
        let config = Config {
            kernel_file: Some("/does/not/exist.wgsl".into()),
            ..gpu_config()
        };
        let (sources, visibilities) = random_inputs(1, 1);
        let mut samples = vec![ComplexSample::default()];
        let result = compute(&config, &sources, &visibilities, &mut samples);
        assert!(matches!(
            result,
            Err(DftError::Gpu(GpuError::KernelFile { .. })) | Err(DftError::Gpu(GpuError::NoDevice))
        ));
    }
}
