// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod arg_files;
mod generate;
mod summary;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn pst_stat_cmd() -> Command {
    Command::cargo_bin("pst_stat").unwrap()
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

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(
    filename: T,
    dir: U,
    contents: &str,
) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    f.write_all(contents.as_bytes()).unwrap();
    path
}

/// Write a small synthetic STAT file with `pst_stat generate`.
fn generate_small(output: &Path, extra_args: &[&str]) {
    #[rustfmt::skip]
    let cmd = pst_stat_cmd()
        .args([
            "generate",
            "--output", &output.display().to_string(),
            "--nchan", "8",
            "--nsamp", "16",
            "--nbit", "8",
            "--nfreq-bins", "4",
            "--ntime-bins", "2",
            "--nrebin", "32",
        ])
        .args(extra_args)
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", get_cmd_output(cmd).1);
}
