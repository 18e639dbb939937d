// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The in-memory representation of a STAT file.
//!
//! A STAT file is split into [`Metadata`] (the header scalars and vectors) and
//! [`Data`] (the multi-dimensional statistics). The two are only ever handed
//! out together as a [`Statistics`], which can only be constructed once every
//! array agrees with the counts in the metadata.

#[cfg(test)]
mod tests;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{constants::NUM_TIMESERIES_STATS, schema::*};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Based on the header, expected {key} to have shape {expected:?}, but it had shape {actual:?} instead!")]
    BadShape {
        key: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Expected the header value {key} to be {expected}, but it was {actual}")]
    BadCount {
        key: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("START_CHAN {start_chan} with NCHAN {nchan} runs past the largest representable channel number")]
    ChannelOverflow { start_chan: u32, nchan: u32 },
}

/// The header of a STAT file. Field names are the lower-cased on-disk keys
/// (see [`crate::schema::map_key`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// The layout version of the file this came from (or will be written to).
    pub file_format_version: String,

    /// The execution block ID.
    pub eb_id: String,

    /// Should be "SKALow" or "SKAMid".
    pub telescope: String,

    pub scan_id: u64,

    pub beam_id: String,

    /// The start of the scan, to the nearest second (e.g.
    /// "2023-10-23-11:00:00").
    pub utc_start: String,

    /// The offset from `utc_start` of the first sample in the file
    /// [seconds].
    pub t_min: f64,

    /// The offset from `utc_start` of the end of the data in the file
    /// [seconds].
    pub t_max: f64,

    /// The centre frequency of the whole band [MHz].
    pub frequency_mhz: f64,

    /// The bandwidth of the whole band [MHz].
    pub bandwidth_mhz: f64,

    pub start_chan: u32,
    pub npol: u32,
    pub ndim: u32,
    pub nchan: u32,

    /// The number of frequency bins in the spectrogram.
    pub nchan_ds: u32,

    /// The number of temporal bins in the spectrogram and timeseries.
    pub ndat_ds: u32,

    /// The number of bins in the (non-rebinned) histograms. This is 2^nbit.
    pub histogram_nbin: u32,

    /// The number of bins in the rebinned histograms.
    pub nrebin: u32,

    /// The centre frequency of each channel [MHz].
    pub channel_freq_mhz: Vec<f64>,

    /// The centre frequency of each spectrogram frequency bin [MHz].
    pub frequency_bins: Vec<f64>,

    /// The centre of each temporal bin, as an offset from `t_min` [seconds].
    pub timeseries_bins: Vec<f64>,

    /// The number of samples (per polarisation and dimension) that went into
    /// the statistics.
    pub num_samples: u32,

    /// As with `num_samples`, but only counting samples in channels not
    /// flagged for RFI.
    pub num_samples_rfi_excised: u32,

    /// The number of samples in each channel.
    pub num_samples_spectrum: Vec<u32>,

    pub num_invalid_packets: u32,
}

/// The last channel of a band of `nchan` channels starting at `start_chan`,
/// or `None` if it can't be represented. An empty band ends at `start_chan`.
pub fn checked_end_chan(start_chan: u32, nchan: u32) -> Option<u32> {
    start_chan.checked_add(nchan.saturating_sub(1))
}

impl Metadata {
    /// The last channel described by this header. Saturates if the header
    /// doesn't pass [`Metadata::validate`].
    pub fn end_chan(&self) -> u32 {
        match self.nchan {
            0 => self.start_chan.saturating_sub(1),
            n => self.start_chan.saturating_add(n - 1),
        }
    }

    /// The smallest (most negative) raw sample value. Histogram bin `i`
    /// counts raw samples with value `clip_low() + i`.
    pub fn clip_low(&self) -> i64 {
        -(i64::from(self.histogram_nbin) / 2)
    }

    /// The shape that the array stored under `key` must have given this
    /// header. `None` if `key` isn't a data key.
    pub fn expected_shape(&self, key: &str) -> Option<Vec<usize>> {
        let npol = self.npol as usize;
        let ndim = self.ndim as usize;
        let nchan = self.nchan as usize;
        let nbin = self.histogram_nbin as usize;
        let nrebin = self.nrebin as usize;
        let nchan_ds = self.nchan_ds as usize;
        let ndat_ds = self.ndat_ds as usize;

        let shape = match key {
            MEAN_FREQUENCY_AVG
            | MEAN_FREQUENCY_AVG_RFI_EXCISED
            | VARIANCE_FREQUENCY_AVG
            | VARIANCE_FREQUENCY_AVG_RFI_EXCISED
            | NUM_CLIPPED_SAMPLES
            | NUM_CLIPPED_SAMPLES_RFI_EXCISED => vec![npol, ndim],
            MEAN_SPECTRUM | VARIANCE_SPECTRUM | NUM_CLIPPED_SAMPLES_SPECTRUM => {
                vec![npol, ndim, nchan]
            }
            MEAN_SPECTRAL_POWER | MAX_SPECTRAL_POWER => vec![npol, nchan],
            HISTOGRAM_1D_FREQ_AVG | HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED => vec![npol, ndim, nbin],
            HISTOGRAM_REBINNED_2D_FREQ_AVG | HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED => {
                vec![npol, nrebin, nrebin]
            }
            HISTOGRAM_REBINNED_1D_FREQ_AVG | HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED => {
                vec![npol, ndim, nrebin]
            }
            SPECTROGRAM => vec![npol, nchan_ds, ndat_ds],
            TIMESERIES | TIMESERIES_RFI_EXCISED => vec![npol, ndat_ds, NUM_TIMESERIES_STATS],
            _ => return None,
        };
        Some(shape)
    }

    /// Check that the header is self consistent; vector lengths must match
    /// their counts.
    pub fn validate(&self) -> Result<(), StatsError> {
        for (key, expected, actual) in [
            (NPOL, crate::constants::NPOL, self.npol),
            (NDIM, crate::constants::NDIM, self.ndim),
        ] {
            if expected != actual {
                return Err(StatsError::BadCount {
                    key,
                    expected,
                    actual,
                });
            }
        }

        if checked_end_chan(self.start_chan, self.nchan).is_none() {
            return Err(StatsError::ChannelOverflow {
                start_chan: self.start_chan,
                nchan: self.nchan,
            });
        }

        for (key, expected, actual) in [
            (CHAN_FREQ, self.nchan, self.channel_freq_mhz.len()),
            (FREQUENCY_BINS, self.nchan_ds, self.frequency_bins.len()),
            (TIMESERIES_BINS, self.ndat_ds, self.timeseries_bins.len()),
            (NUM_SAMPLES_SPECTRUM, self.nchan, self.num_samples_spectrum.len()),
        ] {
            if expected as usize != actual {
                return Err(StatsError::BadShape {
                    key,
                    expected: vec![expected as usize],
                    actual: vec![actual],
                });
            }
        }

        Ok(())
    }
}

/// A borrowed view of one of the arrays in [`Data`], tagged with its on-disk
/// element type.
#[derive(Debug, Clone)]
pub enum DataArray<'a> {
    F32(ArrayViewD<'a, f32>),
    U32(ArrayViewD<'a, u32>),
}

impl DataArray<'_> {
    pub fn shape(&self) -> &[usize] {
        match self {
            DataArray::F32(a) => a.shape(),
            DataArray::U32(a) => a.shape(),
        }
    }
}

/// The statistics of a STAT file. Array axes are listed in each field's
/// documentation; "pol" and "dim" axes are indexed by
/// [`crate::Polarisation`] and [`crate::Dimension`].
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    /// Mean of the data over all channels and samples [pol][dim].
    pub mean_frequency_avg: Array2<f32>,

    /// As with `mean_frequency_avg`, without the RFI-flagged channels.
    pub mean_frequency_avg_rfi_excised: Array2<f32>,

    /// Variance of the data over all channels and samples [pol][dim].
    pub variance_frequency_avg: Array2<f32>,

    pub variance_frequency_avg_rfi_excised: Array2<f32>,

    /// Mean of each channel [pol][dim][chan].
    pub mean_spectrum: Array3<f32>,

    /// Variance of each channel [pol][dim][chan].
    pub variance_spectrum: Array3<f32>,

    /// Mean power (real^2 + imag^2) of each channel [pol][chan].
    pub mean_spectral_power: Array2<f32>,

    /// Maximum power of each channel [pol][chan].
    pub max_spectral_power: Array2<f32>,

    /// Histogram of raw values over all channels [pol][dim][bin].
    pub histogram_1d_freq_avg: Array3<u32>,

    pub histogram_1d_freq_avg_rfi_excised: Array3<u32>,

    /// Joint histogram of rebinned (real, imag) values [pol][real][imag].
    pub rebinned_histogram_2d_freq_avg: Array3<u32>,

    pub rebinned_histogram_2d_freq_avg_rfi_excised: Array3<u32>,

    /// Histogram of rebinned values [pol][dim][bin].
    pub rebinned_histogram_1d_freq_avg: Array3<u32>,

    pub rebinned_histogram_1d_freq_avg_rfi_excised: Array3<u32>,

    /// Number of samples at either digitiser limit [pol][dim][chan].
    pub num_clipped_samples_spectrum: Array3<u32>,

    /// Number of clipped samples over all channels [pol][dim].
    pub num_clipped_samples: Array2<u32>,

    pub num_clipped_samples_rfi_excised: Array2<u32>,

    /// Power summed into frequency and temporal bins [pol][freq bin][time
    /// bin].
    pub spectrogram: Array3<f32>,

    /// Max, min and mean of the power over all channels [pol][time
    /// bin][stat]. The last axis is indexed by
    /// [`crate::TimeseriesDimension`].
    pub timeseries: Array3<f32>,

    pub timeseries_rfi_excised: Array3<f32>,
}

impl Data {
    /// Every array paired with its on-disk key, in [`DATA_KEYS`] order.
    pub fn arrays(&self) -> [(&'static str, DataArray<'_>); 20] {
        use DataArray::{F32, U32};

        [
            (MEAN_FREQUENCY_AVG, F32(self.mean_frequency_avg.view().into_dyn())),
            (
                MEAN_FREQUENCY_AVG_RFI_EXCISED,
                F32(self.mean_frequency_avg_rfi_excised.view().into_dyn()),
            ),
            (VARIANCE_FREQUENCY_AVG, F32(self.variance_frequency_avg.view().into_dyn())),
            (
                VARIANCE_FREQUENCY_AVG_RFI_EXCISED,
                F32(self.variance_frequency_avg_rfi_excised.view().into_dyn()),
            ),
            (MEAN_SPECTRUM, F32(self.mean_spectrum.view().into_dyn())),
            (VARIANCE_SPECTRUM, F32(self.variance_spectrum.view().into_dyn())),
            (MEAN_SPECTRAL_POWER, F32(self.mean_spectral_power.view().into_dyn())),
            (MAX_SPECTRAL_POWER, F32(self.max_spectral_power.view().into_dyn())),
            (HISTOGRAM_1D_FREQ_AVG, U32(self.histogram_1d_freq_avg.view().into_dyn())),
            (
                HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED,
                U32(self.histogram_1d_freq_avg_rfi_excised.view().into_dyn()),
            ),
            (
                HISTOGRAM_REBINNED_2D_FREQ_AVG,
                U32(self.rebinned_histogram_2d_freq_avg.view().into_dyn()),
            ),
            (
                HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED,
                U32(self.rebinned_histogram_2d_freq_avg_rfi_excised.view().into_dyn()),
            ),
            (
                HISTOGRAM_REBINNED_1D_FREQ_AVG,
                U32(self.rebinned_histogram_1d_freq_avg.view().into_dyn()),
            ),
            (
                HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED,
                U32(self.rebinned_histogram_1d_freq_avg_rfi_excised.view().into_dyn()),
            ),
            (
                NUM_CLIPPED_SAMPLES_SPECTRUM,
                U32(self.num_clipped_samples_spectrum.view().into_dyn()),
            ),
            (NUM_CLIPPED_SAMPLES, U32(self.num_clipped_samples.view().into_dyn())),
            (
                NUM_CLIPPED_SAMPLES_RFI_EXCISED,
                U32(self.num_clipped_samples_rfi_excised.view().into_dyn()),
            ),
            (SPECTROGRAM, F32(self.spectrogram.view().into_dyn())),
            (TIMESERIES, F32(self.timeseries.view().into_dyn())),
            (TIMESERIES_RFI_EXCISED, F32(self.timeseries_rfi_excised.view().into_dyn())),
        ]
    }

    /// Check every array against the shapes implied by `metadata`.
    pub fn validate(&self, metadata: &Metadata) -> Result<(), StatsError> {
        for (key, array) in self.arrays() {
            // All keys yielded by `arrays` are data keys.
            let expected = metadata.expected_shape(key).unwrap_or_default();
            if array.shape() != expected.as_slice() {
                return Err(StatsError::BadShape {
                    key,
                    expected,
                    actual: array.shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

/// A consistent pair of [`Metadata`] and [`Data`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    metadata: Metadata,
    data: Data,
}

impl Statistics {
    /// Pair up metadata and data, checking that every array has the shape
    /// implied by the metadata.
    pub fn new(metadata: Metadata, data: Data) -> Result<Statistics, StatsError> {
        metadata.validate()?;
        data.validate(&metadata)?;
        Ok(Statistics { metadata, data })
    }

    pub(crate) fn new_unchecked(metadata: Metadata, data: Data) -> Statistics {
        debug_assert_eq!(metadata.validate(), Ok(()));
        debug_assert_eq!(data.validate(&metadata), Ok(()));
        Statistics { metadata, data }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn into_parts(self) -> (Metadata, Data) {
        (self.metadata, self.data)
    }

    pub fn npol(&self) -> usize {
        self.metadata.npol as usize
    }

    pub fn ndim(&self) -> usize {
        self.metadata.ndim as usize
    }

    pub fn nchan(&self) -> usize {
        self.metadata.nchan as usize
    }
}
