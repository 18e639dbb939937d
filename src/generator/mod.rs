// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic STAT files.
//!
//! Gaussian noise is drawn for every polarisation, complex component, channel
//! and sample, quantised as a PST digitiser would, and reduced to the same
//! statistics the real pipeline produces. This is intended for testing
//! consumers of STAT files without a telescope.

mod config;
mod error;
mod reduce;

pub use config::{recalc_nbins, StatConfig, StatSettings};
pub use error::{ConfigError, GeneratorError};
pub use reduce::{calc_stats_with_rng, gaussian_samples, reduce, GeneratedStats};

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CURRENT_FILE_FORMAT_VERSION, DEFAULT_UTC_START},
    io::write_statistics,
    Metadata, Statistics,
};

/// Draw synthetic voltages with the thread-local RNG and reduce them to
/// statistics.
pub fn calc_stats(config: &StatConfig) -> GeneratedStats {
    calc_stats_with_rng(config, &mut rand::thread_rng())
}

/// What the statistics are said to have been observed as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanIdentifiers {
    pub eb_id: String,
    pub telescope: String,
    pub scan_id: u64,
    pub beam_id: String,
    pub utc_start: String,
}

impl Default for ScanIdentifiers {
    fn default() -> Self {
        Self {
            eb_id: String::new(),
            telescope: String::from("SKALow"),
            scan_id: 0,
            beam_id: String::from("1"),
            utc_start: DEFAULT_UTC_START.to_string(),
        }
    }
}

/// Produces a STAT file of synthetic statistics. The statistics are drawn once,
/// when the generator is made; generating repeatedly writes the same values.
#[derive(Debug, Clone)]
pub struct StatFileGenerator {
    config: StatConfig,
    statistics: Statistics,
}

impl StatFileGenerator {
    pub fn new(config: StatConfig, ids: ScanIdentifiers) -> StatFileGenerator {
        let generated = calc_stats(&config);
        StatFileGenerator::from_generated(config, ids, generated)
    }

    /// Use statistics that have already been calculated (e.g. with a seeded
    /// RNG via [`calc_stats_with_rng`]).
    pub fn from_generated(
        config: StatConfig,
        ids: ScanIdentifiers,
        generated: GeneratedStats,
    ) -> StatFileGenerator {
        let GeneratedStats {
            channel_freq_mhz,
            frequency_bins,
            timeseries_bins,
            data,
        } = generated;
        let settings = config.settings();
        let nchan = config.nchan() as u32;
        let nsamp = config.total_samples_per_channel() as u32;
        let metadata = Metadata {
            file_format_version: CURRENT_FILE_FORMAT_VERSION.to_string(),
            eb_id: ids.eb_id,
            telescope: ids.telescope,
            scan_id: ids.scan_id,
            beam_id: ids.beam_id,
            utc_start: ids.utc_start,
            t_min: 0.0,
            t_max: config.total_sample_time(),
            frequency_mhz: settings.frequency_mhz,
            bandwidth_mhz: settings.bandwidth_mhz,
            start_chan: settings.start_chan,
            npol: config.npol() as u32,
            ndim: config.ndim() as u32,
            nchan,
            nchan_ds: config.nfreq_bins() as u32,
            ndat_ds: config.ntime_bins() as u32,
            histogram_nbin: config.nbin() as u32,
            nrebin: config.nrebin() as u32,
            channel_freq_mhz,
            frequency_bins,
            timeseries_bins,
            num_samples: nchan * nsamp,
            num_samples_rfi_excised: config.non_rfi_channels().len() as u32 * nsamp,
            num_samples_spectrum: vec![nsamp; config.nchan()],
            num_invalid_packets: 0,
        };

        // The metadata is built from the same config as the data, so the two
        // always agree.
        let statistics = Statistics::new_unchecked(metadata, data);
        StatFileGenerator { config, statistics }
    }

    pub fn config(&self) -> &StatConfig {
        &self.config
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Write the statistics to a STAT file at `path`.
    pub fn generate<P: AsRef<Path>>(&self, path: P) -> Result<(), GeneratorError> {
        let path = path.as_ref();
        write_statistics(path, &self.statistics)?;
        info!("Wrote synthetic statistics to {}", path.display());
        Ok(())
    }
}
