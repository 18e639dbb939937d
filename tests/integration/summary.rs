// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the "summary" command-line interface.

use serde_json::Value;
use tempfile::TempDir;

use crate::{generate_small, get_cmd_output, pst_stat_cmd};

/// The JSON document printed by `summary --json`. Nothing else may be on
/// stdout.
fn json_from_stdout(stdout: &str) -> Value {
    serde_json::from_str(stdout)
        .unwrap_or_else(|e| panic!("stdout isn't a JSON document ({e}): {stdout}"))
}

#[test]
fn test_summary_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("stats.npz");
    generate_small(&file, &["--scan-id", "31", "--start-chan", "16"]);

    let cmd = pst_stat_cmd()
        .args(["summary", &file.display().to_string(), "--json"])
        .ok();
    assert!(cmd.is_ok(), "summary failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    let json = json_from_stdout(&stdout);
    // Log messages are still available.
    assert!(stderr.contains("pst_stat summary"), "{stderr}");

    let header = json["header"].as_array().unwrap();
    let value_of = |key: &str| {
        header
            .iter()
            .find(|r| r["key"] == key)
            .map(|r| r["value"].clone())
            .unwrap_or_else(|| panic!("{key} not in header"))
    };
    assert_eq!(value_of("FILE_FORMAT_VERSION"), "1.1.0");
    assert_eq!(value_of("SCAN_ID"), 31);
    assert_eq!(value_of("START_CHAN"), 16);
    assert_eq!(value_of("END_CHAN"), 23);
    assert_eq!(value_of("NCHAN"), 8);

    let rows = json["frequency_averaged"].as_array().unwrap();
    assert_eq!(rows.len(), 2 * 2 * 2);
    assert_eq!(rows[0]["pol"], "A");
    assert_eq!(rows[0]["dim"], "Real");
    assert_eq!(rows[0]["rfi_excised"], false);
    assert_eq!(rows[7]["pol"], "B");
    assert_eq!(rows[7]["dim"], "Imag");
    assert_eq!(rows[7]["rfi_excised"], true);
}

#[test]
fn test_summary_selection() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("stats.npz");
    generate_small(&file, &[]);

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "summary", &file.display().to_string(),
            "--pol", "1",
            "--dim", "0",
            "--rfi-excised", "false",
            "--json",
        ])
        .ok();
    assert!(cmd.is_ok(), "summary failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    let json = json_from_stdout(&stdout);

    let rows = json["frequency_averaged"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["pol"], "B");
    assert_eq!(rows[0]["dim"], "Real");

    // Compare against the library.
    let stats = pst_stat::read(&file).unwrap();
    let expected = stats.data().num_clipped_samples[(1, 0)];
    assert_eq!(rows[0]["num_clipped_samples"], expected);
}

#[test]
fn test_summary_table() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("stats.npz");
    generate_small(&file, &["--eb-id", "eb-z999-20250505-00003"]);

    let cmd = pst_stat_cmd()
        .args(["summary", &file.display().to_string(), "--pol", "0"])
        .ok();
    assert!(cmd.is_ok(), "summary failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("eb-z999-20250505-00003"), "{stdout}");
    assert!(stdout.contains("END_CHAN"), "{stdout}");
    assert!(stdout.contains("rfi_excised"), "{stdout}");
}

#[test]
fn test_summary_bad_pol_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("stats.npz");
    generate_small(&file, &[]);

    let cmd = pst_stat_cmd()
        .args(["summary", &file.display().to_string(), "--pol", "2"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Polarisation index"), "{stderr}");
}

#[test]
fn test_summary_missing_file_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("nothing_here.npz");

    let cmd = pst_stat_cmd()
        .args(["summary", &file.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error:"), "{stderr}");
    assert!(stderr.contains("does not exist"), "{stderr}");
}
