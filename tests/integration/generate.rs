// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the "generate" command-line interface.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::{generate_small, get_cmd_output, pst_stat_cmd};

#[test]
fn test_generate_and_read() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("stats.npz");
    generate_small(
        &output,
        &[
            "--eb-id",
            "eb-t001-20240101-00001",
            "--telescope",
            "SKAMid",
            "--scan-id",
            "7",
            "--rfi-channels",
            "2",
            "5",
        ],
    );

    let stats = pst_stat::read(&output).unwrap();
    let m = stats.metadata();
    assert_eq!(m.file_format_version, "1.1.0");
    assert_eq!(m.eb_id, "eb-t001-20240101-00001");
    assert_eq!(m.telescope, "SKAMid");
    assert_eq!(m.scan_id, 7);
    assert_eq!(m.nchan, 8);
    assert_eq!(m.nchan_ds, 4);
    assert_eq!(m.ndat_ds, 2);
    assert_eq!(m.histogram_nbin, 256);
    assert_eq!(m.nrebin, 32);
    assert_eq!(m.num_samples, 8 * 16);
    assert_eq!(m.num_samples_rfi_excised, 6 * 16);
    assert_eq!(m.num_samples_spectrum, vec![16; 8]);

    let d = stats.data();
    assert_eq!(d.histogram_1d_freq_avg.dim(), (2, 2, 256));
    assert_eq!(d.histogram_1d_freq_avg_rfi_excised.sum(), 2 * 2 * 6 * 16);
}

#[test]
fn test_generate_with_stat_base() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--stat-base", &tmp_dir.path().display().to_string(),
            "--eb-id", "eb-m001-20230921-245",
            "--scan-id", "12345",
            "--utc-start", "2023-10-23-11:00:00",
            "--obs-offset", "1024",
            "--file-number", "3",
            "--nchan", "4",
            "--nsamp", "8",
            "--nbit", "8",
            "--nfreq-bins", "2",
            "--ntime-bins", "2",
            "--nrebin", "16",
        ])
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", get_cmd_output(cmd).1);

    let expected: PathBuf = [
        tmp_dir.path().to_str().unwrap(),
        "product",
        "eb-m001-20230921-245",
        "pst-low",
        "12345",
        "monitoring_stats",
        "2023-10-23-11:00:00_0000000000001024_000003.npz",
    ]
    .iter()
    .collect();
    assert!(expected.exists(), "{} wasn't written", expected.display());

    let parsed = pst_stat::filenames::parse_stat_filename(&expected).unwrap();
    assert_eq!(parsed.obs_offset, 1024);
    assert_eq!(parsed.file_number, 3);
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("stats.npz");
    generate_small(&output, &["--dry-run"]);
    assert!(!output.exists());
}

#[test]
fn test_generate_without_output_fails() {
    let cmd = pst_stat_cmd().args(["generate", "--nchan", "4"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("base path"), "{stderr}");
}

#[test]
fn test_generate_with_empty_eb_id_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--stat-base", &tmp_dir.path().display().to_string(),
            "--eb-id", "",
            "--scan-id", "12345",
            "--nchan", "4",
            "--nfreq-bins", "2",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("execution block ID"), "{stderr}");
    assert!(!tmp_dir.path().join("product").exists());
}

#[test]
fn test_generate_bad_nbit_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("stats.npz");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--output", &output.display().to_string(),
            "--nbit", "12",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("nbit"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_generate_out_of_range_rfi_channel_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("stats.npz");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--output", &output.display().to_string(),
            "--nchan", "4",
            "--nfreq-bins", "2",
            "--rfi-channels", "4",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("out of range"), "{stderr}");
}

#[test]
fn test_generate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("stats.npz");

    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--output", &output.display().to_string(),
            "--nchan", "8",
            "--nfreq-bins", "4",
            "--nbit", "8",
        ])
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("pst_stat generate"), "{stdout}");
}
