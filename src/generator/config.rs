// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration of the synthetic statistics generator.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::{constants::*, stats::checked_end_chan};

/// The user-facing knobs of the generator. These are validated and expanded
/// into a [`StatConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatSettings {
    pub npol: u32,
    pub ndim: u32,

    /// The number of channels.
    pub nchan: u32,

    /// The number of samples of each channel per heap.
    pub nsamp: u32,

    /// The number of heaps of data.
    pub nheap: u32,

    /// The number of bits per sample; either 8 or 16.
    pub nbit: u32,

    /// The requested number of spectrogram frequency bins. This is reduced to
    /// a divisor of `nchan` if necessary.
    pub nfreq_bins: u32,

    /// The requested number of spectrogram and timeseries temporal bins. This
    /// is reduced to a divisor of the total number of samples per channel if
    /// necessary.
    pub ntime_bins: u32,

    /// The number of bins in the rebinned histograms.
    pub nrebin: u32,

    /// The number of standard deviations that fit in the positive half of the
    /// digitiser range.
    pub sigma: f64,

    /// Frequency ranges to mask. Currently unused.
    pub freq_mask: String,

    /// [MHz]
    pub frequency_mhz: f64,

    /// [MHz]
    pub bandwidth_mhz: f64,

    pub start_chan: u32,

    /// The time per sample [microseconds].
    pub tsamp: f64,

    /// The oversampling factor. Currently unused.
    pub os_factor: f64,

    /// Indices of channels flagged as containing RFI. These are left out of
    /// all "RFI excised" statistics.
    pub rfi_channels: Vec<usize>,
}

impl Default for StatSettings {
    fn default() -> Self {
        Self {
            npol: NPOL,
            ndim: NDIM,
            nchan: DEFAULT_NCHAN,
            nsamp: DEFAULT_NSAMP,
            nheap: DEFAULT_NHEAP,
            nbit: DEFAULT_NBIT,
            nfreq_bins: DEFAULT_NFREQ_BINS,
            ntime_bins: DEFAULT_NTIME_BINS,
            nrebin: DEFAULT_NREBIN,
            sigma: DEFAULT_SIGMA,
            freq_mask: String::new(),
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            bandwidth_mhz: DEFAULT_BANDWIDTH_MHZ,
            start_chan: DEFAULT_START_CHAN,
            tsamp: DEFAULT_TSAMP_US,
            os_factor: DEFAULT_OS_FACTOR,
            rfi_channels: vec![],
        }
    }
}

/// A validated generator configuration, with all derived quantities computed
/// up front.
#[derive(Debug, Clone, PartialEq)]
pub struct StatConfig {
    settings: StatSettings,

    nfreq_bins: u32,
    ntime_bins: u32,
    nbit_limit: i32,
    scale: f64,
    total_samples_per_channel: usize,
    non_rfi_channels: Vec<usize>,
}

impl StatConfig {
    pub fn new(mut settings: StatSettings) -> Result<StatConfig, ConfigError> {
        if !matches!(settings.nbit, 8 | 16) {
            return Err(ConfigError::BadNbit(settings.nbit));
        }
        for (name, expected, actual) in [
            ("npol", NPOL, settings.npol),
            ("ndim", NDIM, settings.ndim),
        ] {
            if expected != actual {
                return Err(ConfigError::BadAxisLength {
                    name,
                    expected,
                    actual,
                });
            }
        }
        for (name, value) in [
            ("nchan", settings.nchan),
            ("nsamp", settings.nsamp),
            ("nheap", settings.nheap),
            ("nfreq_bins", settings.nfreq_bins),
            ("ntime_bins", settings.ntime_bins),
            ("nrebin", settings.nrebin),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        for (name, value) in [
            ("sigma", settings.sigma),
            ("bandwidth_mhz", settings.bandwidth_mhz),
            ("tsamp", settings.tsamp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if checked_end_chan(settings.start_chan, settings.nchan).is_none() {
            return Err(ConfigError::ChannelOverflow {
                start_chan: settings.start_chan,
                nchan: settings.nchan,
            });
        }

        settings.rfi_channels.sort_unstable();
        settings.rfi_channels.dedup();
        if let Some(&chan) = settings
            .rfi_channels
            .iter()
            .find(|&&c| c >= settings.nchan as usize)
        {
            return Err(ConfigError::RfiChannelOutOfRange {
                chan,
                nchan: settings.nchan,
            });
        }
        let non_rfi_channels = (0..settings.nchan as usize)
            .filter(|c| settings.rfi_channels.binary_search(c).is_err())
            .collect();

        let total_samples_per_channel = settings.nheap as usize * settings.nsamp as usize;
        let nfreq_bins =
            recalc_nbins(settings.nchan as usize, settings.nfreq_bins as usize) as u32;
        let ntime_bins =
            recalc_nbins(total_samples_per_channel, settings.ntime_bins as usize) as u32;
        if nfreq_bins != settings.nfreq_bins {
            warn!(
                "{} frequency bins don't evenly divide {} channels; using {nfreq_bins}",
                settings.nfreq_bins, settings.nchan
            );
        }
        if ntime_bins != settings.ntime_bins {
            warn!(
                "{} temporal bins don't evenly divide {total_samples_per_channel} samples; using {ntime_bins}",
                settings.ntime_bins
            );
        }

        let nbit_limit = 1 << (settings.nbit - 1);
        let scale = settings.sigma / f64::from(nbit_limit);

        let config = StatConfig {
            settings,
            nfreq_bins,
            ntime_bins,
            nbit_limit,
            scale,
            total_samples_per_channel,
            non_rfi_channels,
        };
        debug!("{:#?}", config);
        Ok(config)
    }

    /// The settings this configuration was made from. The bin counts here are
    /// those that were requested, not necessarily those used.
    pub fn settings(&self) -> &StatSettings {
        &self.settings
    }

    pub fn npol(&self) -> usize {
        self.settings.npol as usize
    }

    pub fn ndim(&self) -> usize {
        self.settings.ndim as usize
    }

    pub fn nchan(&self) -> usize {
        self.settings.nchan as usize
    }

    pub fn nbit(&self) -> u32 {
        self.settings.nbit
    }

    /// The number of spectrogram frequency bins actually used; always a
    /// divisor of `nchan`.
    pub fn nfreq_bins(&self) -> usize {
        self.nfreq_bins as usize
    }

    /// The number of temporal bins actually used; always a divisor of
    /// [`StatConfig::total_samples_per_channel`].
    pub fn ntime_bins(&self) -> usize {
        self.ntime_bins as usize
    }

    pub fn nrebin(&self) -> usize {
        self.settings.nrebin as usize
    }

    /// 2^(nbit-1)
    pub fn nbit_limit(&self) -> i32 {
        self.nbit_limit
    }

    /// The smallest value a raw sample can take.
    pub fn clip_low(&self) -> i32 {
        -self.nbit_limit
    }

    /// The largest value a raw sample can take.
    pub fn clip_high(&self) -> i32 {
        self.nbit_limit - 1
    }

    /// The size of one digitiser level in units of the voltage standard
    /// deviation.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The number of histogram bins; one per possible raw value.
    pub fn nbin(&self) -> usize {
        1 << self.settings.nbit
    }

    /// Added to raw values before they are rebinned.
    pub fn rebin_offset(&self) -> i32 {
        (self.settings.nrebin / 2) as i32
    }

    /// The largest rebinned value.
    pub fn rebin_max(&self) -> i32 {
        self.settings.nrebin as i32 - 1
    }

    pub fn total_samples_per_channel(&self) -> usize {
        self.total_samples_per_channel
    }

    /// The number of channels summed into each spectrogram frequency bin.
    pub fn freq_bin_factor(&self) -> usize {
        self.nchan() / self.nfreq_bins()
    }

    /// The number of samples summed into each temporal bin.
    pub fn temporal_bin_factor(&self) -> usize {
        self.total_samples_per_channel / self.ntime_bins()
    }

    pub fn tsamp_secs(&self) -> f64 {
        self.settings.tsamp * 1e-6
    }

    /// The time spanned by the samples of one channel [seconds].
    pub fn total_sample_time(&self) -> f64 {
        self.tsamp_secs() * self.total_samples_per_channel as f64
    }

    /// Sorted, de-duplicated indices of channels flagged as containing RFI.
    pub fn rfi_channels(&self) -> &[usize] {
        &self.settings.rfi_channels
    }

    /// Indices of the channels that aren't flagged for RFI.
    pub fn non_rfi_channels(&self) -> &[usize] {
        &self.non_rfi_channels
    }
}

/// Get a number of bins near `req_bins` that evenly divides `num_items`.
///
/// The number of items per bin starts at `num_items / req_bins` and is
/// reduced until it divides `num_items`, so the result can exceed `req_bins`
/// (e.g. 32 items and 5 requested bins gives 8 bins of 4). If no factor above
/// 1 works, `num_items` is used instead (i.e. one item per bin).
pub fn recalc_nbins(num_items: usize, req_bins: usize) -> usize {
    if req_bins == 0 {
        return num_items;
    }
    if num_items % req_bins == 0 {
        return req_bins;
    }

    let mut factor = (num_items / req_bins).max(1);
    while factor > 1 {
        if num_items % factor == 0 {
            return num_items / factor;
        }
        factor -= 1;
    }
    num_items
}
