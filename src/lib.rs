// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reading, writing, viewing and synthesising the voltage statistics (STAT) files
produced by the Pulsar Timing (PST) signal-processing pipeline.
 */

pub mod constants;
pub mod filenames;
pub mod generator;
pub mod io;
pub mod schema;
pub mod stats;
pub mod views;

mod cli;

// Re-exports.
pub use cli::{PstStat, PstStatError};
pub use io::{read, write, write_statistics};
pub use schema::{Dimension, Polarisation, TimeseriesDimension};
pub use stats::{Data, DataArray, Metadata, Statistics, StatsError};
