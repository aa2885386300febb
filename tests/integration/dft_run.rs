// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs, io::Write};

use indoc::{indoc, writedoc};
use tempfile::TempDir;

use crate::{
    direct_dft, get_cmd_output, make_file_in_dir, UNIT_TEST_SOURCES, UNIT_TEST_VISIBILITIES,
};

/// Parse an output visibility file into its count and rows.
fn read_output(contents: &str) -> (usize, Vec<Vec<f64>>) {
    let mut lines = contents.lines();
    let count = lines.next().unwrap().trim().parse().unwrap();
    let rows = lines
        .map(|l| {
            l.split_whitespace()
                .map(|f| f.parse().unwrap())
                .collect::<Vec<f64>>()
        })
        .collect();
    (count, rows)
}

#[test]
fn test_synthetic_run() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vis.txt");
    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "run", "-d", "cpu",
            "--synthetic-sources", "--num-sources", "3",
            "--synthetic-visibilities", "--num-visibilities", "16",
            "--seed", "11",
            "--no-progress-bars",
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "dft-run failed on synthetic data: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("direct_dft dft-run complete."), "{stdout}");
    assert!(stdout.contains("Total vis: 16"), "{stdout}");

    let (count, rows) = read_output(&fs::read_to_string(&output).unwrap());
    assert_eq!(count, 16);
    assert_eq!(rows.len(), 16);
    for row in rows {
        assert_eq!(row.len(), 6);
        // Unit-intensity sources can't give a sample brighter than their sum.
        assert!(row[3].hypot(row[4]) <= 3.0 + 1e-6);
        assert_eq!(row[5], 1.0);
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let mut outputs = vec![];
    for name in ["a.txt", "b.txt"] {
        let output = dir.path().join(name);
        #[rustfmt::skip]
        let cmd = direct_dft()
            .args([
                "run", "-d", "cpu",
                "--synthetic-sources", "--num-sources", "5",
                "--synthetic-visibilities", "--num-visibilities", "8", "--gaussian",
                "--seed", "2024",
                "-q",
                "-o", &format!("{}", output.display()),
            ])
            .ok();
        assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
        outputs.push(fs::read_to_string(output).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_run_from_files() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vis.txt");
    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "dft-run", "-d", "cpu",
            "-s", UNIT_TEST_SOURCES,
            "-i", UNIT_TEST_VISIBILITIES,
            "-o", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "dft-run failed on test files: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Successfully loaded 12 sources from file"), "{stdout}");
    assert!(stdout.contains("Successfully loaded 64 visibilities from file"), "{stdout}");

    // The written uvw are back in wavelengths, so they match the input file
    // to the written precision.
    let (count, rows) = read_output(&fs::read_to_string(&output).unwrap());
    let (_, inputs) = read_output(&fs::read_to_string(UNIT_TEST_VISIBILITIES).unwrap());
    assert_eq!(count, 64);
    for (row, input) in rows.iter().zip(inputs.iter()) {
        for i in 0..3 {
            assert!((row[i] - input[i]).abs() < 1e-5, "{row:?} vs {input:?}");
        }
        // Samples agree with the reference to the written precision.
        for i in 3..5 {
            assert!((row[i] - input[i]).abs() < 2e-6, "{row:?} vs {input:?}");
        }
    }
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vis.txt");
    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "run", "-d", "cpu",
            "--synthetic-sources", "--synthetic-visibilities",
            "--dry-run",
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_args_file_and_save_toml() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vis.txt");
    let (args_file, mut f) = make_file_in_dir("args.toml", dir.path());
    writedoc!(
        f,
        r#"
            synthetic_sources = true
            synthetic_visibilities = true
            num_sources = 2
            num_visibilities = 4
            seed = 5
            quiet = true
            output_vis = "{}"
        "#,
        output.display()
    )
    .unwrap();
    drop(f);
    let saved = dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "run", "-d", "cpu",
            &format!("{}", args_file.display()),
            "--num-visibilities", "6",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());

    // The command line wins over the file.
    let contents = fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().next(), Some("6"));
    let saved = fs::read_to_string(saved).unwrap();
    assert!(saved.contains("num_visibilities = 6"), "{saved}");
    assert!(saved.contains("num_sources = 2"), "{saved}");
}

#[test]
fn test_missing_source_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.txt");
    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "run", "-d", "cpu",
            "-s", &format!("{}", missing.display()),
            "--synthetic-visibilities",
            "-o", &format!("{}", dir.path().join("vis.txt").display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't load sources"), "{stderr}");
    assert!(stderr.contains("missing.txt"), "{stderr}");
}

#[test]
fn test_malformed_visibility_file() {
    let dir = TempDir::new().unwrap();
    let (vis_file, mut f) = make_file_in_dir("bad_vis.txt", dir.path());
    f.write_all(
        indoc! {"
            2
            1.0 2.0 3.0 0.0 0.0 1.0
            1.0 2.0
        "}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    #[rustfmt::skip]
    let cmd = direct_dft()
        .args([
            "run", "-d", "cpu",
            "--synthetic-sources",
            "-i", &format!("{}", vis_file.display()),
            "-o", &format!("{}", dir.path().join("vis.txt").display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't load visibilities"), "{stderr}");
}
