// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The canonical names of everything stored in a STAT file, and the mapping
//! from those names to the fields of [`crate::Metadata`] and [`crate::Data`].
//!
//! On-disk keys are upper case (e.g. `NBIN_HIST`); in-memory field names are
//! lower case, with a handful of exceptions listed in [`KEY_MAP`].


use std::collections::HashMap;

use strum_macros::{EnumCount, EnumIter};
use thiserror::Error;

pub const FILE_FORMAT_VERSION: &str = "FILE_FORMAT_VERSION";
pub const HEADER: &str = "HEADER";

// Fields of the header record.
pub const EB_ID: &str = "EB_ID";
pub const TELESCOPE: &str = "TELESCOPE";
pub const SCAN_ID: &str = "SCAN_ID";
pub const BEAM_ID: &str = "BEAM_ID";
pub const UTC_START: &str = "UTC_START";
pub const T_MIN: &str = "T_MIN";
pub const T_MAX: &str = "T_MAX";
pub const FREQ: &str = "FREQ";
pub const BW: &str = "BW";
pub const START_CHAN: &str = "START_CHAN";
pub const NPOL: &str = "NPOL";
pub const NDIM: &str = "NDIM";
pub const NCHAN: &str = "NCHAN";
pub const NCHAN_DS: &str = "NCHAN_DS";
pub const NDAT_DS: &str = "NDAT_DS";
pub const NBIN_HIST: &str = "NBIN_HIST";
pub const NREBIN: &str = "NREBIN";
pub const CHAN_FREQ: &str = "CHAN_FREQ";
pub const FREQUENCY_BINS: &str = "FREQUENCY_BINS";
pub const TIMESERIES_BINS: &str = "TIMESERIES_BINS";
pub const NUM_SAMPLES: &str = "NUM_SAMPLES";
pub const NUM_SAMPLES_RFI_EXCISED: &str = "NUM_SAMPLES_RFI_EXCISED";
pub const NUM_SAMPLES_SPECTRUM: &str = "NUM_SAMPLES_SPECTRUM";
pub const NUM_INVALID_PACKETS: &str = "NUM_INVALID_PACKETS";

// Data arrays.
pub const MEAN_FREQUENCY_AVG: &str = "MEAN_FREQUENCY_AVG";
pub const MEAN_FREQUENCY_AVG_RFI_EXCISED: &str = "MEAN_FREQUENCY_AVG_RFI_EXCISED";
pub const VARIANCE_FREQUENCY_AVG: &str = "VARIANCE_FREQUENCY_AVG";
pub const VARIANCE_FREQUENCY_AVG_RFI_EXCISED: &str = "VARIANCE_FREQUENCY_AVG_RFI_EXCISED";
pub const MEAN_SPECTRUM: &str = "MEAN_SPECTRUM";
pub const VARIANCE_SPECTRUM: &str = "VARIANCE_SPECTRUM";
pub const MEAN_SPECTRAL_POWER: &str = "MEAN_SPECTRAL_POWER";
pub const MAX_SPECTRAL_POWER: &str = "MAX_SPECTRAL_POWER";
pub const HISTOGRAM_1D_FREQ_AVG: &str = "HISTOGRAM_1D_FREQ_AVG";
pub const HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED: &str = "HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED";
pub const HISTOGRAM_REBINNED_2D_FREQ_AVG: &str = "HISTOGRAM_REBINNED_2D_FREQ_AVG";
pub const HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED: &str =
    "HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED";
pub const HISTOGRAM_REBINNED_1D_FREQ_AVG: &str = "HISTOGRAM_REBINNED_1D_FREQ_AVG";
pub const HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED: &str =
    "HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED";
pub const NUM_CLIPPED_SAMPLES_SPECTRUM: &str = "NUM_CLIPPED_SAMPLES_SPECTRUM";
pub const NUM_CLIPPED_SAMPLES: &str = "NUM_CLIPPED_SAMPLES";
pub const NUM_CLIPPED_SAMPLES_RFI_EXCISED: &str = "NUM_CLIPPED_SAMPLES_RFI_EXCISED";
pub const SPECTROGRAM: &str = "SPECTROGRAM";
pub const TIMESERIES: &str = "TIMESERIES";
pub const TIMESERIES_RFI_EXCISED: &str = "TIMESERIES_RFI_EXCISED";

/// Not stored; derived from `START_CHAN` and `NCHAN` for display.
pub const END_CHAN: &str = "END_CHAN";

/// Every key that ends up in [`crate::Metadata`], in header-record order
/// (preceded by the format version, which is stored separately).
pub const HEADER_KEYS: [&str; 25] = [
    FILE_FORMAT_VERSION,
    EB_ID,
    TELESCOPE,
    SCAN_ID,
    BEAM_ID,
    UTC_START,
    T_MIN,
    T_MAX,
    FREQ,
    BW,
    START_CHAN,
    NPOL,
    NDIM,
    NCHAN,
    NCHAN_DS,
    NDAT_DS,
    NBIN_HIST,
    NREBIN,
    CHAN_FREQ,
    FREQUENCY_BINS,
    TIMESERIES_BINS,
    NUM_SAMPLES,
    NUM_SAMPLES_RFI_EXCISED,
    NUM_SAMPLES_SPECTRUM,
    NUM_INVALID_PACKETS,
];

/// The header keys only present in the extended (current) format.
pub const EXTENDED_HEADER_KEYS: [&str; 4] = [
    NUM_SAMPLES,
    NUM_SAMPLES_RFI_EXCISED,
    NUM_SAMPLES_SPECTRUM,
    NUM_INVALID_PACKETS,
];

/// Every array stored in a STAT file, in the order they are written.
pub const DATA_KEYS: [&str; 20] = [
    MEAN_FREQUENCY_AVG,
    MEAN_FREQUENCY_AVG_RFI_EXCISED,
    VARIANCE_FREQUENCY_AVG,
    VARIANCE_FREQUENCY_AVG_RFI_EXCISED,
    MEAN_SPECTRUM,
    VARIANCE_SPECTRUM,
    MEAN_SPECTRAL_POWER,
    MAX_SPECTRAL_POWER,
    HISTOGRAM_1D_FREQ_AVG,
    HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED,
    HISTOGRAM_REBINNED_2D_FREQ_AVG,
    HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED,
    HISTOGRAM_REBINNED_1D_FREQ_AVG,
    HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED,
    NUM_CLIPPED_SAMPLES_SPECTRUM,
    NUM_CLIPPED_SAMPLES,
    NUM_CLIPPED_SAMPLES_RFI_EXCISED,
    SPECTROGRAM,
    TIMESERIES,
    TIMESERIES_RFI_EXCISED,
];

lazy_static::lazy_static! {
    /// On-disk keys whose in-memory name isn't simply the lower-cased key.
    pub static ref KEY_MAP: HashMap<&'static str, &'static str> = HashMap::from([
        (BW, "bandwidth_mhz"),
        (FREQ, "frequency_mhz"),
        (NBIN_HIST, "histogram_nbin"),
        (CHAN_FREQ, "channel_freq_mhz"),
        (HISTOGRAM_REBINNED_2D_FREQ_AVG, "rebinned_histogram_2d_freq_avg"),
        (
            HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED,
            "rebinned_histogram_2d_freq_avg_rfi_excised",
        ),
        (HISTOGRAM_REBINNED_1D_FREQ_AVG, "rebinned_histogram_1d_freq_avg"),
        (
            HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED,
            "rebinned_histogram_1d_freq_avg_rfi_excised",
        ),
    ]);
}

/// Map an on-disk key to the name of the field holding it in memory. Keys
/// without an explicit mapping are lower-cased.
pub fn map_key(key: &str) -> String {
    match KEY_MAP.get(key) {
        Some(field) => field.to_string(),
        None => key.to_lowercase(),
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Polarisation index must be 0 or 1, got {0}")]
    Polarisation(usize),

    #[error("Dimension index must be 0 (real) or 1 (imaginary), got {0}")]
    Dimension(usize),
}

/// One of the two orthogonal polarisations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum Polarisation {
    A = 0,
    B = 1,
}

/// A component of a complex voltage. Not a spatial dimension!
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum Dimension {
    Real = 0,
    Imag = 1,
}

/// The position of each statistic along the last axis of the timeseries
/// arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum TimeseriesDimension {
    Max = 0,
    Min = 1,
    Mean = 2,
}

const POLARISATION_TEXT: [&str; 2] = ["A", "B"];
const DIMENSION_TEXT: [&str; 2] = ["Real", "Imag"];

impl Polarisation {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Dimension {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TimeseriesDimension {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Polarisation {
    type Error = SelectorError;

    fn try_from(i: usize) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(Polarisation::A),
            1 => Ok(Polarisation::B),
            _ => Err(SelectorError::Polarisation(i)),
        }
    }
}

impl TryFrom<usize> for Dimension {
    type Error = SelectorError;

    fn try_from(i: usize) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(Dimension::Real),
            1 => Ok(Dimension::Imag),
            _ => Err(SelectorError::Dimension(i)),
        }
    }
}

/// The text used when presenting a polarisation (e.g. "A").
pub fn polarisation_text(pol: Polarisation) -> &'static str {
    POLARISATION_TEXT[pol.index()]
}

/// The text used when presenting a complex component (e.g. "Real").
pub fn dimension_text(dim: Dimension) -> &'static str {
    DIMENSION_TEXT[dim.index()]
}
