// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all pst_stat-related errors. This should be the *only*
//! error enum that is publicly visible from the CLI.

use thiserror::Error;

use crate::{
    filenames::StatFilenameError,
    generator::{ConfigError, GeneratorError},
    io::{StatReadError, StatWriteError},
    schema::SelectorError,
};

/// The *only* publicly visible error from the `pst_stat` binary. Each variant
/// groups the errors of a single concern so the message shown to the user
/// says where the problem lies.
#[derive(Error, Debug)]
pub enum PstStatError {
    /// The generator was configured with something it can't use.
    #[error("Invalid generator configuration: {0}")]
    Config(String),

    /// An error related to reading STAT files.
    #[error("{0}")]
    StatRead(String),

    /// An error related to writing STAT files.
    #[error("{0}")]
    StatWrite(String),

    /// The output path couldn't be determined.
    #[error("Couldn't determine the STAT file path: {0}\n\nEither supply --output, or --stat-base with the scan identifiers")]
    Filename(String),

    /// A bad polarisation or dimension selector.
    #[error("{0}")]
    Selection(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<ConfigError> for PstStatError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<GeneratorError> for PstStatError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::Config(e) => Self::from(e),
            GeneratorError::Write(e) => Self::from(e),
        }
    }
}

impl From<StatReadError> for PstStatError {
    fn from(e: StatReadError) -> Self {
        let s = e.to_string();
        match e {
            StatReadError::NotFound(_) | StatReadError::Format(_) => Self::StatRead(s),
            StatReadError::IO(e) => Self::from(e),
        }
    }
}

impl From<StatWriteError> for PstStatError {
    fn from(e: StatWriteError) -> Self {
        let s = e.to_string();
        match e {
            StatWriteError::Format(_) => Self::StatWrite(s),
            StatWriteError::IO(e) => Self::from(e),
        }
    }
}

impl From<StatFilenameError> for PstStatError {
    fn from(e: StatFilenameError) -> Self {
        Self::Filename(e.to_string())
    }
}

impl From<SelectorError> for PstStatError {
    fn from(e: SelectorError) -> Self {
        Self::Selection(e.to_string())
    }
}

impl From<log::SetLoggerError> for PstStatError {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Generic(format!("Failed to initialise logging: {e}"))
    }
}

impl From<serde_json::Error> for PstStatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for PstStatError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
