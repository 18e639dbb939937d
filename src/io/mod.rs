// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing STAT files.
//!
//! A STAT file is a zip archive of NumPy `.npy` members, one per key listed
//! in [`crate::schema`]. Data arrays are stored with their natural dtype and
//! shape. The format version is stored as UTF-8 bytes under
//! `FILE_FORMAT_VERSION`, and the header record (see [`header`]) as bytes
//! under `HEADER`.

mod error;
mod header;
mod read;
mod write;

pub use error::{FormatError, StatReadError, StatWriteError};
pub use read::read;
pub use write::{write, write_statistics};

use crate::constants::{FILE_FORMAT_VERSION_1_0_0, FILE_FORMAT_VERSION_1_1_0};

/// The versions that can be read. Only the newest is ever written.
pub const SUPPORTED_FILE_FORMAT_VERSIONS: [&str; 2] =
    [FILE_FORMAT_VERSION_1_0_0, FILE_FORMAT_VERSION_1_1_0];
