// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod dft_run;
mod validate;

use std::{
    fs::File,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

const UNIT_TEST_SOURCES: &str = "test_files/unit_test_sources.txt";
const UNIT_TEST_VISIBILITIES: &str = "test_files/unit_test_visibilities.txt";

fn direct_dft() -> Command {
    Command::cargo_bin("direct_dft").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(filename: T, dir: U) -> (PathBuf, File) {
    let path = dir.as_ref().join(filename);
    let f = File::create(&path).expect("couldn't make file");
    (path, f)
}

#[test]
fn test_devices_lists_the_cpu() {
    let cmd = direct_dft()
        .args(["devices", "--no-progress-bars"])
        .ok();
    assert!(cmd.is_ok(), "devices failed on simple test data: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("cpu: "), "{stdout}");
    assert!(stdout.contains("direct_dft devices complete."), "{stdout}");
}

#[test]
fn test_no_subcommand_fails() {
    let cmd = direct_dft().ok();
    assert!(cmd.is_err());
}
