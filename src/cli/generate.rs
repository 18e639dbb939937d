// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The `generate` subcommand.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::{common::ARG_FILE_HELP, PstStatError};
use crate::{
    filenames::StatFilenameConstructor,
    generator::{ScanIdentifiers, StatConfig, StatFileGenerator, StatSettings},
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct GenerateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    pub(super) args_file: Option<PathBuf>,

    /// The path of the STAT file to write. If this isn't given, the path is
    /// constructed from --stat-base and the scan identifiers.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// The directory under which STAT files are organised by execution block,
    /// subsystem and scan.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) stat_base: Option<PathBuf>,

    /// The offset of the file from the start of the scan [bytes]. Only used
    /// when constructing the file name. Default: 0
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) obs_offset: Option<u64>,

    /// The sequence number of the file within the scan. Only used when
    /// constructing the file name. Default: 0
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) file_number: Option<u64>,

    /// The execution block ID, e.g. eb-m001-20230921-245.
    #[clap(long, help_heading = "SCAN")]
    pub(super) eb_id: Option<String>,

    /// SKALow or SKAMid. Default: SKALow
    #[clap(long, help_heading = "SCAN")]
    pub(super) telescope: Option<String>,

    #[clap(long, help_heading = "SCAN")]
    pub(super) scan_id: Option<u64>,

    /// Default: 1
    #[clap(long, help_heading = "SCAN")]
    pub(super) beam_id: Option<String>,

    /// The UTC start time of the scan, e.g. 2023-10-23-11:00:00.
    #[clap(long, help_heading = "SCAN")]
    pub(super) utc_start: Option<String>,

    /// The number of channels.
    #[clap(long, help_heading = "DATA SHAPE")]
    pub(super) nchan: Option<u32>,

    /// The number of samples of each channel per heap.
    #[clap(long, help_heading = "DATA SHAPE")]
    pub(super) nsamp: Option<u32>,

    /// The number of heaps.
    #[clap(long, help_heading = "DATA SHAPE")]
    pub(super) nheap: Option<u32>,

    /// The number of bits per sample (8 or 16).
    #[clap(long, help_heading = "DATA SHAPE")]
    pub(super) nbit: Option<u32>,

    /// The requested number of spectrogram frequency bins.
    #[clap(long, help_heading = "STATISTICS")]
    pub(super) nfreq_bins: Option<u32>,

    /// The requested number of spectrogram and timeseries temporal bins.
    #[clap(long, help_heading = "STATISTICS")]
    pub(super) ntime_bins: Option<u32>,

    /// The number of bins in the rebinned histograms.
    #[clap(long, help_heading = "STATISTICS")]
    pub(super) nrebin: Option<u32>,

    /// The indices of channels flagged as containing RFI.
    #[clap(long, multiple_values(true), help_heading = "STATISTICS")]
    pub(super) rfi_channels: Option<Vec<usize>>,

    /// The number of standard deviations in the positive half of the
    /// digitiser range.
    #[clap(long, help_heading = "NOISE")]
    pub(super) sigma: Option<f64>,

    /// Frequency ranges to mask. Recorded but currently unused.
    #[clap(long, help_heading = "NOISE")]
    pub(super) freq_mask: Option<String>,

    /// The centre frequency of the band [MHz].
    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) frequency_mhz: Option<f64>,

    /// [MHz]
    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) bandwidth_mhz: Option<f64>,

    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) start_chan: Option<u32>,

    /// The time per sample [microseconds].
    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) tsamp: Option<f64>,

    /// The oversampling factor. Recorded but currently unused.
    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) os_factor: Option<f64>,
}

/// Everything needed to write a synthetic STAT file.
#[derive(Debug)]
struct GenerateParams {
    config: StatConfig,
    ids: ScanIdentifiers,
    path: PathBuf,
}

impl GenerateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<GenerateArgs, PstStatError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = &cli_args.args_file {
            let file_args: GenerateArgs = unpack_arg_file!(arg_file);
            Ok(cli_args.merge_with(file_args))
        } else {
            Ok(cli_args)
        }
    }

    fn merge_with(self, other: Self) -> Self {
        Self {
            args_file: None,
            output: self.output.or(other.output),
            stat_base: self.stat_base.or(other.stat_base),
            obs_offset: self.obs_offset.or(other.obs_offset),
            file_number: self.file_number.or(other.file_number),
            eb_id: self.eb_id.or(other.eb_id),
            telescope: self.telescope.or(other.telescope),
            scan_id: self.scan_id.or(other.scan_id),
            beam_id: self.beam_id.or(other.beam_id),
            utc_start: self.utc_start.or(other.utc_start),
            nchan: self.nchan.or(other.nchan),
            nsamp: self.nsamp.or(other.nsamp),
            nheap: self.nheap.or(other.nheap),
            nbit: self.nbit.or(other.nbit),
            nfreq_bins: self.nfreq_bins.or(other.nfreq_bins),
            ntime_bins: self.ntime_bins.or(other.ntime_bins),
            nrebin: self.nrebin.or(other.nrebin),
            rfi_channels: self.rfi_channels.or(other.rfi_channels),
            sigma: self.sigma.or(other.sigma),
            freq_mask: self.freq_mask.or(other.freq_mask),
            frequency_mhz: self.frequency_mhz.or(other.frequency_mhz),
            bandwidth_mhz: self.bandwidth_mhz.or(other.bandwidth_mhz),
            start_chan: self.start_chan.or(other.start_chan),
            tsamp: self.tsamp.or(other.tsamp),
            os_factor: self.os_factor.or(other.os_factor),
        }
    }

    fn parse(self) -> Result<GenerateParams, PstStatError> {
        // Expose all the struct fields to ensure they're all used.
        let GenerateArgs {
            args_file: _,
            output,
            stat_base,
            obs_offset,
            file_number,
            eb_id,
            telescope,
            scan_id,
            beam_id,
            utc_start,
            nchan,
            nsamp,
            nheap,
            nbit,
            nfreq_bins,
            ntime_bins,
            nrebin,
            rfi_channels,
            sigma,
            freq_mask,
            frequency_mhz,
            bandwidth_mhz,
            start_chan,
            tsamp,
            os_factor,
        } = self;

        let d = StatSettings::default();
        let settings = StatSettings {
            npol: d.npol,
            ndim: d.ndim,
            nchan: nchan.unwrap_or(d.nchan),
            nsamp: nsamp.unwrap_or(d.nsamp),
            nheap: nheap.unwrap_or(d.nheap),
            nbit: nbit.unwrap_or(d.nbit),
            nfreq_bins: nfreq_bins.unwrap_or(d.nfreq_bins),
            ntime_bins: ntime_bins.unwrap_or(d.ntime_bins),
            nrebin: nrebin.unwrap_or(d.nrebin),
            sigma: sigma.unwrap_or(d.sigma),
            freq_mask: freq_mask.unwrap_or(d.freq_mask),
            frequency_mhz: frequency_mhz.unwrap_or(d.frequency_mhz),
            bandwidth_mhz: bandwidth_mhz.unwrap_or(d.bandwidth_mhz),
            start_chan: start_chan.unwrap_or(d.start_chan),
            tsamp: tsamp.unwrap_or(d.tsamp),
            os_factor: os_factor.unwrap_or(d.os_factor),
            rfi_channels: rfi_channels.unwrap_or(d.rfi_channels),
        };
        let config = StatConfig::new(settings)?;

        let d = ScanIdentifiers::default();
        let ids = ScanIdentifiers {
            eb_id: eb_id.clone().unwrap_or(d.eb_id),
            telescope: telescope.unwrap_or(d.telescope),
            scan_id: scan_id.unwrap_or(d.scan_id),
            beam_id: beam_id.unwrap_or(d.beam_id),
            utc_start: utc_start.unwrap_or(d.utc_start),
        };

        let path = match output {
            Some(o) => o,
            None => {
                let mut c = StatFilenameConstructor::new();
                if let Some(base) = stat_base {
                    c.set_base_path(base);
                }
                if let Some(eb_id) = &eb_id {
                    c.set_eb_id(eb_id);
                }
                c.set_telescope(&ids.telescope)?;
                if let Some(scan_id) = scan_id {
                    c.set_scan_id(scan_id);
                }
                c.get_filename(
                    &ids.utc_start,
                    obs_offset.unwrap_or(0),
                    file_number.unwrap_or(0),
                )?
            }
        };

        Ok(GenerateParams { config, ids, path })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), PstStatError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let GenerateParams { config, ids, path } = self.parse()?;

        info!("Output STAT file: {}", path.display());
        info!(
            "{} channels, {} samples per channel, {} frequency bins, {} temporal bins",
            config.nchan(),
            config.total_samples_per_channel(),
            config.nfreq_bins(),
            config.ntime_bins()
        );
        if !config.rfi_channels().is_empty() {
            info!("RFI-flagged channels: {:?}", config.rfi_channels());
        }

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        StatFileGenerator::new(config, ids).generate(&path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_take_precedence() {
        let cli = GenerateArgs {
            nchan: Some(8),
            eb_id: Some("eb-cli".to_string()),
            ..Default::default()
        };
        let file = GenerateArgs {
            nchan: Some(16),
            nsamp: Some(4),
            eb_id: Some("eb-file".to_string()),
            rfi_channels: Some(vec![2]),
            ..Default::default()
        };
        let merged = cli.merge_with(file);
        assert_eq!(merged.nchan, Some(8));
        assert_eq!(merged.nsamp, Some(4));
        assert_eq!(merged.eb_id.as_deref(), Some("eb-cli"));
        assert_eq!(merged.rfi_channels, Some(vec![2]));
    }

    #[test]
    fn test_parse_constructs_path() {
        let args = GenerateArgs {
            stat_base: Some(PathBuf::from("/tmp")),
            eb_id: Some("eb-m001-20230921-245".to_string()),
            scan_id: Some(12345),
            obs_offset: Some(1024),
            file_number: Some(3),
            nchan: Some(8),
            nfreq_bins: Some(4),
            ..Default::default()
        };
        let params = args.parse().unwrap();
        assert_eq!(
            params.path,
            PathBuf::from("/tmp/product/eb-m001-20230921-245/pst-low/12345/monitoring_stats/2023-10-23-11:00:00_0000000000001024_000003.npz")
        );
        assert_eq!(params.config.nchan(), 8);
        assert_eq!(params.ids.telescope, "SKALow");
    }

    #[test]
    fn test_parse_without_path_fails() {
        let result = GenerateArgs::default().parse();
        assert!(matches!(result, Err(PstStatError::Filename(_))));
    }

    #[test]
    fn test_parse_bad_config_fails() {
        let args = GenerateArgs {
            output: Some(PathBuf::from("stats.npz")),
            nbit: Some(12),
            ..Default::default()
        };
        assert!(matches!(args.parse(), Err(PstStatError::Config(_))));
    }

    #[test]
    fn test_unused_settings_say_so() {
        use clap::CommandFactory;

        let cmd = GenerateArgs::command();
        for long in ["os-factor", "freq-mask"] {
            let help = cmd
                .get_arguments()
                .find(|a| a.get_long() == Some(long))
                .and_then(|a| a.get_help())
                .unwrap_or_else(|| panic!("--{long} has no help"));
            assert!(help.contains("currently unused"), "--{long}: {help}");
        }
    }
}
