// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with synthesising statistics.

use thiserror::Error;

use crate::io::StatWriteError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("nbit must be 8 or 16, but {0} was given")]
    BadNbit(u32),

    #[error("{name} must be {expected} for PST voltage data, but {actual} was given")]
    BadAxisLength {
        name: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} must be positive and finite, but {value} was given")]
    NotPositive { name: &'static str, value: f64 },

    #[error("RFI-flagged channel index {chan} is out of range; there are only {nchan} channels")]
    RfiChannelOutOfRange { chan: usize, nchan: u32 },

    #[error("start_chan {start_chan} with {nchan} channels runs past the largest representable channel number")]
    ChannelOverflow { start_chan: u32, nchan: u32 },
}

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Write(#[from] StatWriteError),
}
