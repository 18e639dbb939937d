// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

Defaults here are those used by the synthetic generator when a user doesn't
specify a value.
 */

/// The legacy STAT file format. These files lack the sample-count fields in
/// their header, and can only be read.
pub const FILE_FORMAT_VERSION_1_0_0: &str = "1.0.0";

/// The current STAT file format. This is the only version that is written.
pub const FILE_FORMAT_VERSION_1_1_0: &str = "1.1.0";

/// The version written to new STAT files.
pub const CURRENT_FILE_FORMAT_VERSION: &str = FILE_FORMAT_VERSION_1_1_0;

/// The extension given to STAT files constructed by
/// [`crate::filenames::StatFilenameConstructor`].
pub const STAT_FILE_EXTENSION: &str = "npz";

/// The number of polarisations in PST voltage data (A and B).
pub const NPOL: u32 = 2;

/// The number of components of a complex voltage (real and imaginary).
pub const NDIM: u32 = 2;

/// The number of statistics in each timeseries bin (max, min and mean).
pub const NUM_TIMESERIES_STATS: usize = 3;

pub const DEFAULT_NCHAN: u32 = 432;
pub const DEFAULT_NSAMP: u32 = 32;
pub const DEFAULT_NHEAP: u32 = 1;
pub const DEFAULT_NBIT: u32 = 16;
pub const DEFAULT_NFREQ_BINS: u32 = 36;
pub const DEFAULT_NTIME_BINS: u32 = 4;
pub const DEFAULT_NREBIN: u32 = 256;

/// The number of standard deviations that fit in the positive half of the
/// digitiser range.
pub const DEFAULT_SIGMA: f64 = 3.0;

/// [MHz]
pub const DEFAULT_FREQUENCY_MHZ: f64 = 87.5;

/// [MHz]
pub const DEFAULT_BANDWIDTH_MHZ: f64 = 75.0;

pub const DEFAULT_START_CHAN: u32 = 0;

/// The time per sample [microseconds].
pub const DEFAULT_TSAMP_US: f64 = 207.36;

/// The oversampling factor of the channelised data.
pub const DEFAULT_OS_FACTOR: f64 = 4.0 / 3.0;

/// Used when a generated file isn't given a start time.
pub const DEFAULT_UTC_START: &str = "2023-10-23-11:00:00";
