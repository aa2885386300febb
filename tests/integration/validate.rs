// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs, io::Write};

use tempfile::TempDir;

use crate::{direct_dft, get_cmd_output, make_file_in_dir, UNIT_TEST_VISIBILITIES};

#[test]
fn test_validate_passes_on_the_reference_dataset() {
    let cmd = direct_dft()
        .args(["validate", "-d", "cpu", "--no-progress-bars"])
        .ok();
    assert!(cmd.is_ok(), "validate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("is within the tolerance"), "{stdout}");
}

#[test]
fn test_validate_fails_on_a_perturbed_reference() {
    let dir = TempDir::new().unwrap();
    let reference = fs::read_to_string(UNIT_TEST_VISIBILITIES).unwrap();
    let (perturbed, mut f) = make_file_in_dir("perturbed.txt", dir.path());
    for (i, line) in reference.lines().enumerate() {
        if i == 1 {
            // Shift the first reference sample's real part.
            let mut fields: Vec<f64> = line
                .split_whitespace()
                .map(|f| f.parse().unwrap())
                .collect();
            fields[3] += 0.5;
            let fields: Vec<String> = fields.iter().map(|f| format!("{f:.12}")).collect();
            writeln!(f, "{}", fields.join(" ")).unwrap();
        } else {
            writeln!(f, "{line}").unwrap();
        }
    }
    drop(f);

    let cmd = direct_dft()
        .args(["validate", "-d", "cpu", "-i", &format!("{}", perturbed.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Validation failed"), "{stderr}");
}

#[test]
fn test_validate_loose_tolerance() {
    let cmd = direct_dft()
        .args(["validate", "-d", "cpu", "--tolerance", "1.0"])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
}
