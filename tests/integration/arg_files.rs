// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! This module tests the "generate" command-line interface with toml and json
//! argument files.

use indoc::formatdoc;
use tempfile::tempdir;

use crate::{get_cmd_output, make_file_in_dir, pst_stat_cmd};

#[test]
fn test_toml_arg_file() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let output = temp_dir.path().join("from_toml.npz");
    let toml = make_file_in_dir(
        "generate.toml",
        temp_dir.path(),
        &formatdoc!(
            r#"
                output = "{}"
                eb_id = "eb-f002-20240202-00004"
                telescope = "SKAMid"
                scan_id = 88
                nchan = 16
                nsamp = 8
                nbit = 8
                nfreq_bins = 4
                ntime_bins = 2
                nrebin = 16
                rfi_channels = [0, 3]
            "#,
            output.display()
        ),
    );

    // The command line overrides the file.
    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            &toml.display().to_string(),
            "--nchan", "8",
            "--scan-id", "89",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let stats = pst_stat::read(&output).unwrap();
    let m = stats.metadata();
    assert_eq!(m.eb_id, "eb-f002-20240202-00004");
    assert_eq!(m.telescope, "SKAMid");
    assert_eq!(m.scan_id, 89);
    assert_eq!(m.nchan, 8);
    assert_eq!(m.nchan_ds, 4);
    assert_eq!(m.nrebin, 16);
    assert_eq!(m.num_samples_rfi_excised, 6 * 8);
}

#[test]
fn test_toml_arg_file_rfi_out_of_range() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let output = temp_dir.path().join("bad.npz");
    let toml = make_file_in_dir(
        "generate.toml",
        temp_dir.path(),
        &formatdoc!(
            r#"
                output = "{}"
                nchan = 16
                nfreq_bins = 4
                rfi_channels = [15]
            "#,
            output.display()
        ),
    );

    let cmd = pst_stat_cmd()
        .args(["generate", &toml.display().to_string(), "--nchan", "8"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("out of range"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_json_arg_file() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let output = temp_dir.path().join("from_json.npz");
    let json = make_file_in_dir(
        "generate.json",
        temp_dir.path(),
        &serde_json::json!({
            "output": output,
            "nchan": 4,
            "nsamp": 4,
            "nbit": 8,
            "nfreq_bins": 2,
            "ntime_bins": 2,
            "nrebin": 8,
            "rfi_channels": [1],
        })
        .to_string(),
    );

    let cmd = pst_stat_cmd()
        .args(["generate", &json.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let stats = pst_stat::read(&output).unwrap();
    assert_eq!(stats.metadata().num_samples_rfi_excised, 3 * 4);
}

#[test]
fn test_unknown_arg_file_extension() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let yaml = make_file_in_dir("generate.yaml", temp_dir.path(), "nchan: 4\n");

    let cmd = pst_stat_cmd()
        .args(["generate", &yaml.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}

#[test]
fn test_malformed_toml() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let toml = make_file_in_dir("generate.toml", temp_dir.path(), "nchan = \"many\"\n");

    let cmd = pst_stat_cmd()
        .args(["generate", &toml.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't decode toml"), "{stderr}");
}

#[test]
fn test_save_toml_round_trip() {
    let temp_dir = tempdir().expect("Couldn't make tempdir");
    let output = temp_dir.path().join("saved.npz");
    let saved = temp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--output", &output.display().to_string(),
            "--nchan", "4",
            "--nfreq-bins", "2",
            "--nbit", "8",
            "--rfi-channels", "3",
            "--save-toml", &saved.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    assert!(saved.exists());
    assert!(!output.exists());

    // Running from the saved file does the same thing.
    let cmd = pst_stat_cmd()
        .args(["generate", &saved.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let stats = pst_stat::read(&output).unwrap();
    assert_eq!(stats.metadata().nchan, 4);
    assert_eq!(stats.metadata().num_samples_rfi_excised, 3 * 32);
}
