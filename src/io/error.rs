// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading or writing STAT files.

use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

use crate::stats::StatsError;

/// The contents of a STAT file (or the statistics to be written to one)
/// aren't what they should be.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("The STAT file doesn't contain the required key {key}")]
    MissingKey { key: &'static str },

    #[error("Expected {key} to have dtype {expected}, but it had {actual} instead!")]
    BadDtype {
        key: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Couldn't decode the array stored under {key}: {msg}")]
    BadArray { key: &'static str, msg: String },

    #[error("The header record ended before the {field} field could be read")]
    TruncatedHeader { field: &'static str },

    #[error("The header record has {0} unexpected bytes after its last field")]
    TrailingHeaderBytes(usize),

    #[error("The {field} field is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("Unsupported STAT file format version '{got}'; supported versions are: {supported}")]
    UnsupportedVersion { got: String, supported: String },

    #[error("Not a STAT file container: {0}")]
    BadContainer(String),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Error, Debug)]
pub enum StatReadError {
    #[error("STAT file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StatWriteError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl From<StatsError> for StatReadError {
    fn from(e: StatsError) -> Self {
        Self::Format(FormatError::Stats(e))
    }
}

impl From<StatsError> for StatWriteError {
    fn from(e: StatsError) -> Self {
        Self::Format(FormatError::Stats(e))
    }
}

// A missing member is reported where it's looked up; everything else about
// the container is either a format or an IO problem.
impl From<ZipError> for StatReadError {
    fn from(e: ZipError) -> Self {
        match e {
            ZipError::Io(e) => Self::IO(e),
            e => Self::Format(FormatError::BadContainer(e.to_string())),
        }
    }
}

impl From<ZipError> for StatWriteError {
    fn from(e: ZipError) -> Self {
        match e {
            ZipError::Io(e) => Self::IO(e),
            e => Self::IO(std::io::Error::new(std::io::ErrorKind::Other, e)),
        }
    }
}
