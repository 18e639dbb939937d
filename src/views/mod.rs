// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tabular re-projections of [`Statistics`].
//!
//! Every view takes a [`ViewSelection`]; a selector that is `None` selects
//! everything along its axis, and a view without a given axis ignores that
//! selector. Rows are ordered by polarisation, then dimension, then RFI
//! excision (unexcised first), then the view's own axis.


use std::fmt::Display;

use itertools::iproduct;
use ndarray::prelude::*;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;

use crate::{
    schema::*, Dimension, Metadata, Polarisation, Statistics, TimeseriesDimension,
};

/// Which polarisations, complex components and RFI-excision variants to
/// include in a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub pol: Option<Polarisation>,
    pub dim: Option<Dimension>,
    pub rfi_excised: Option<bool>,
}

impl ViewSelection {
    /// Select everything.
    pub fn all() -> ViewSelection {
        ViewSelection::default()
    }

    fn pols(&self) -> Vec<Polarisation> {
        match self.pol {
            Some(p) => vec![p],
            None => Polarisation::iter().collect(),
        }
    }

    fn dims(&self) -> Vec<Dimension> {
        match self.dim {
            Some(d) => vec![d],
            None => Dimension::iter().collect(),
        }
    }

    fn rfi_flags(&self) -> Vec<bool> {
        match self.rfi_excised {
            Some(r) => vec![r],
            None => vec![false, true],
        }
    }
}

fn ser_pol<S: Serializer>(pol: &Polarisation, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(polarisation_text(*pol))
}

fn ser_dim<S: Serializer>(dim: &Dimension, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(dimension_text(*dim))
}

/// A header value of any type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Text(String),
    UInt(u64),
    Float(f64),
    Floats(Vec<f64>),
    UInts(Vec<u32>),
}

impl Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Text(s) => write!(f, "{s}"),
            HeaderValue::UInt(v) => write!(f, "{v}"),
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::Floats(v) => write!(f, "{v:?}"),
            HeaderValue::UInts(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderRow {
    pub key: &'static str,
    pub value: HeaderValue,
}

/// Get the value stored under an on-disk header key (or `END_CHAN`).
pub fn header_value(metadata: &Metadata, key: &str) -> Option<HeaderValue> {
    use HeaderValue::*;

    let m = metadata;
    let v = match key {
        FILE_FORMAT_VERSION => Text(m.file_format_version.clone()),
        EB_ID => Text(m.eb_id.clone()),
        TELESCOPE => Text(m.telescope.clone()),
        SCAN_ID => UInt(m.scan_id),
        BEAM_ID => Text(m.beam_id.clone()),
        UTC_START => Text(m.utc_start.clone()),
        T_MIN => Float(m.t_min),
        T_MAX => Float(m.t_max),
        FREQ => Float(m.frequency_mhz),
        BW => Float(m.bandwidth_mhz),
        START_CHAN => UInt(m.start_chan.into()),
        END_CHAN => UInt(m.end_chan().into()),
        NPOL => UInt(m.npol.into()),
        NDIM => UInt(m.ndim.into()),
        NCHAN => UInt(m.nchan.into()),
        NCHAN_DS => UInt(m.nchan_ds.into()),
        NDAT_DS => UInt(m.ndat_ds.into()),
        NBIN_HIST => UInt(m.histogram_nbin.into()),
        NREBIN => UInt(m.nrebin.into()),
        CHAN_FREQ => Floats(m.channel_freq_mhz.clone()),
        FREQUENCY_BINS => Floats(m.frequency_bins.clone()),
        TIMESERIES_BINS => Floats(m.timeseries_bins.clone()),
        NUM_SAMPLES => UInt(m.num_samples.into()),
        NUM_SAMPLES_RFI_EXCISED => UInt(m.num_samples_rfi_excised.into()),
        NUM_SAMPLES_SPECTRUM => UInts(m.num_samples_spectrum.clone()),
        NUM_INVALID_PACKETS => UInt(m.num_invalid_packets.into()),
        _ => return None,
    };
    Some(v)
}

/// Every header key with its value, in header order, with `END_CHAN`
/// following `START_CHAN`.
pub fn header(stats: &Statistics) -> Vec<HeaderRow> {
    HEADER_KEYS
        .iter()
        .flat_map(|&key| {
            if key == START_CHAN {
                vec![key, END_CHAN]
            } else {
                vec![key]
            }
        })
        .filter_map(|key| {
            header_value(stats.metadata(), key).map(|value| HeaderRow { key, value })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyAveragedRow {
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    #[serde(serialize_with = "ser_dim")]
    pub dim: Dimension,
    pub rfi_excised: bool,
    pub mean: f32,
    pub variance: f32,
    pub num_clipped_samples: u32,
}

pub fn frequency_averaged_stats(
    stats: &Statistics,
    sel: ViewSelection,
) -> Vec<FrequencyAveragedRow> {
    let d = stats.data();
    iproduct!(sel.pols(), sel.dims(), sel.rfi_flags())
        .map(|(pol, dim, rfi_excised)| {
            let i = (pol.index(), dim.index());
            let (mean, variance, clipped) = if rfi_excised {
                (
                    &d.mean_frequency_avg_rfi_excised,
                    &d.variance_frequency_avg_rfi_excised,
                    &d.num_clipped_samples_rfi_excised,
                )
            } else {
                (
                    &d.mean_frequency_avg,
                    &d.variance_frequency_avg,
                    &d.num_clipped_samples,
                )
            };
            FrequencyAveragedRow {
                pol,
                dim,
                rfi_excised,
                mean: mean[i],
                variance: variance[i],
                num_clipped_samples: clipped[i],
            }
        })
        .collect()
}

/// Per-channel statistics. There are no RFI-excised variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRow {
    /// The absolute channel number, i.e. counting from `START_CHAN`.
    pub channel: u32,
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    #[serde(serialize_with = "ser_dim")]
    pub dim: Dimension,
    pub channel_freq_mhz: f64,
    pub mean: f32,
    pub variance: f32,
    pub num_clipped_samples: u32,
}

pub fn channel_stats(stats: &Statistics, sel: ViewSelection) -> Vec<ChannelRow> {
    let m = stats.metadata();
    let d = stats.data();
    iproduct!(sel.pols(), sel.dims(), 0..stats.nchan())
        .map(|(pol, dim, c)| {
            let i = (pol.index(), dim.index(), c);
            ChannelRow {
                channel: m.start_chan + c as u32,
                pol,
                dim,
                channel_freq_mhz: m.channel_freq_mhz[c],
                mean: d.mean_spectrum[i],
                variance: d.variance_spectrum[i],
                num_clipped_samples: d.num_clipped_samples_spectrum[i],
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralPowerRow {
    pub channel: u32,
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    pub channel_freq_mhz: f64,
    pub mean: f32,
    pub max: f32,
}

pub fn spectral_power(stats: &Statistics, sel: ViewSelection) -> Vec<SpectralPowerRow> {
    let m = stats.metadata();
    let d = stats.data();
    iproduct!(sel.pols(), 0..stats.nchan())
        .map(|(pol, c)| SpectralPowerRow {
            channel: m.start_chan + c as u32,
            pol,
            channel_freq_mhz: m.channel_freq_mhz[c],
            mean: d.mean_spectral_power[(pol.index(), c)],
            max: d.max_spectral_power[(pol.index(), c)],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramRow {
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    #[serde(serialize_with = "ser_dim")]
    pub dim: Dimension,
    pub rfi_excised: bool,
    /// The raw sample value counted in this bin.
    pub value: i64,
    pub count: u32,
}

pub fn histogram(stats: &Statistics, sel: ViewSelection) -> Vec<HistogramRow> {
    let clip_low = stats.metadata().clip_low();
    let d = stats.data();
    iproduct!(sel.pols(), sel.dims(), sel.rfi_flags())
        .flat_map(|(pol, dim, rfi_excised)| {
            let hist = if rfi_excised {
                &d.histogram_1d_freq_avg_rfi_excised
            } else {
                &d.histogram_1d_freq_avg
            };
            hist.slice(s![pol.index(), dim.index(), ..])
                .iter()
                .enumerate()
                .map(|(i, &count)| HistogramRow {
                    pol,
                    dim,
                    rfi_excised,
                    value: clip_low + i as i64,
                    count,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebinnedHistogramRow {
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    #[serde(serialize_with = "ser_dim")]
    pub dim: Dimension,
    pub rfi_excised: bool,
    pub bin: usize,
    pub count: u32,
}

pub fn rebinned_histogram(stats: &Statistics, sel: ViewSelection) -> Vec<RebinnedHistogramRow> {
    let d = stats.data();
    iproduct!(sel.pols(), sel.dims(), sel.rfi_flags())
        .flat_map(|(pol, dim, rfi_excised)| {
            let hist = if rfi_excised {
                &d.rebinned_histogram_1d_freq_avg_rfi_excised
            } else {
                &d.rebinned_histogram_1d_freq_avg
            };
            hist.slice(s![pol.index(), dim.index(), ..])
                .iter()
                .enumerate()
                .map(|(bin, &count)| RebinnedHistogramRow {
                    pol,
                    dim,
                    rfi_excised,
                    bin,
                    count,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The joint (real, imaginary) rebinned histogram of one polarisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RebinnedHistogram2d<'a> {
    pub pol: Polarisation,
    pub rfi_excised: bool,
    /// [real bin][imag bin]
    pub counts: ArrayView2<'a, u32>,
}

pub fn rebinned_histogram_2d(
    stats: &Statistics,
    sel: ViewSelection,
) -> Vec<RebinnedHistogram2d<'_>> {
    let d = stats.data();
    iproduct!(sel.pols(), sel.rfi_flags())
        .map(|(pol, rfi_excised)| {
            let hist = if rfi_excised {
                &d.rebinned_histogram_2d_freq_avg_rfi_excised
            } else {
                &d.rebinned_histogram_2d_freq_avg
            };
            RebinnedHistogram2d {
                pol,
                rfi_excised,
                counts: hist.slice(s![pol.index(), .., ..]),
            }
        })
        .collect()
}

/// The spectrogram of one polarisation, with its axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram<'a> {
    pub pol: Polarisation,
    /// [MHz]
    pub frequency_bins: &'a [f64],
    /// [seconds]
    pub timeseries_bins: &'a [f64],
    /// [freq bin][time bin]
    pub power: ArrayView2<'a, f32>,
}

pub fn spectrogram(stats: &Statistics, sel: ViewSelection) -> Vec<Spectrogram<'_>> {
    let m = stats.metadata();
    sel.pols()
        .into_iter()
        .map(|pol| Spectrogram {
            pol,
            frequency_bins: &m.frequency_bins,
            timeseries_bins: &m.timeseries_bins,
            power: stats.data().spectrogram.slice(s![pol.index(), .., ..]),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesRow {
    #[serde(serialize_with = "ser_pol")]
    pub pol: Polarisation,
    pub rfi_excised: bool,
    pub bin: usize,
    /// The centre of the bin as an offset from `UTC_START` [seconds].
    pub time_offset: f64,
    pub max: f32,
    pub min: f32,
    pub mean: f32,
}

pub fn timeseries(stats: &Statistics, sel: ViewSelection) -> Vec<TimeseriesRow> {
    let m = stats.metadata();
    let d = stats.data();
    iproduct!(sel.pols(), sel.rfi_flags(), 0..m.timeseries_bins.len())
        .map(|(pol, rfi_excised, bin)| {
            let ts = if rfi_excised {
                &d.timeseries_rfi_excised
            } else {
                &d.timeseries
            };
            let stat = |t: TimeseriesDimension| ts[(pol.index(), bin, t.index())];
            TimeseriesRow {
                pol,
                rfi_excised,
                bin,
                time_offset: m.t_min + m.timeseries_bins[bin],
                max: stat(TimeseriesDimension::Max),
                min: stat(TimeseriesDimension::Min),
                mean: stat(TimeseriesDimension::Mean),
            }
        })
        .collect()
}
