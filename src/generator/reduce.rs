// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise raw voltages and reduce them to statistics.

use log::trace;
use ndarray::prelude::*;
use rand::Rng;
use rand_distr::StandardNormal;

use super::StatConfig;
use crate::{constants::NUM_TIMESERIES_STATS, Data, TimeseriesDimension};

/// Statistics calculated from synthetic voltages, plus the axis labels that go
/// with them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedStats {
    /// The centre frequency of each channel [MHz].
    pub channel_freq_mhz: Vec<f64>,

    /// The centre frequency of each spectrogram frequency bin [MHz].
    pub frequency_bins: Vec<f64>,

    /// The centre of each temporal bin [seconds].
    pub timeseries_bins: Vec<f64>,

    pub data: Data,
}

/// Draw Gaussian noise for every [pol][dim][chan][sample], quantised to the
/// digitiser levels of `config`. 8-bit values are held in an `i16` too.
pub fn gaussian_samples<R: Rng + ?Sized>(config: &StatConfig, rng: &mut R) -> Array4<i16> {
    let low = f64::from(config.clip_low());
    let high = f64::from(config.clip_high());
    let scale = config.scale();
    Array4::from_shape_simple_fn(
        (
            config.npol(),
            config.ndim(),
            config.nchan(),
            config.total_samples_per_channel(),
        ),
        || {
            let v: f64 = rng.sample(StandardNormal);
            (v / scale).round_ties_even().clamp(low, high) as i16
        },
    )
}

/// Draw synthetic voltages with `rng` and reduce them to statistics.
pub fn calc_stats_with_rng<R: Rng + ?Sized>(config: &StatConfig, rng: &mut R) -> GeneratedStats {
    let raw = gaussian_samples(config, rng);
    reduce(config, raw.view())
}

/// Reduce raw voltages [pol][dim][chan][sample] to statistics.
pub fn reduce(config: &StatConfig, raw: ArrayView4<i16>) -> GeneratedStats {
    let npol = config.npol();
    let ndim = config.ndim();
    let nchan = config.nchan();
    let nsamp = config.total_samples_per_channel();
    let nfreq_bins = config.nfreq_bins();
    let ntime_bins = config.ntime_bins();
    let nbin = config.nbin();
    let nrebin = config.nrebin();
    let non_rfi = config.non_rfi_channels();
    trace!("Reducing raw voltages with shape {:?}", raw.shape());

    let scale = config.scale();
    let scaled = raw.mapv(|v| f64::from(v) * scale);

    // [pol][dim][chan]
    let mean_spectrum = scaled.map_axis(Axis(3), |lane| mean(lane.iter().copied()));
    let variance_spectrum = scaled.map_axis(Axis(3), |lane| sample_variance(lane.iter().copied()));

    let mut mean_frequency_avg = Array2::zeros((npol, ndim));
    let mut mean_frequency_avg_rfi_excised = Array2::zeros((npol, ndim));
    let mut variance_frequency_avg = Array2::zeros((npol, ndim));
    let mut variance_frequency_avg_rfi_excised = Array2::zeros((npol, ndim));
    for ((p, d), out) in mean_frequency_avg.indexed_iter_mut() {
        *out = mean(mean_spectrum.slice(s![p, d, ..]).iter().copied()) as f32;
        mean_frequency_avg_rfi_excised[(p, d)] =
            mean(non_rfi.iter().map(|&c| mean_spectrum[(p, d, c)])) as f32;
        variance_frequency_avg[(p, d)] =
            sample_variance(scaled.slice(s![p, d, .., ..]).iter().copied()) as f32;
        variance_frequency_avg_rfi_excised[(p, d)] = sample_variance(
            non_rfi
                .iter()
                .flat_map(|&c| scaled.slice(s![p, d, c, ..]).to_vec()),
        ) as f32;
    }

    // [pol][chan][sample]
    let power = scaled.map_axis(Axis(1), |lane| lane.iter().map(|v| v * v).sum::<f64>());
    let mean_spectral_power = power.map_axis(Axis(2), |lane| mean(lane.iter().copied()) as f32);
    let max_spectral_power = power.map_axis(Axis(2), |lane| {
        lane.iter().copied().fold(f64::NEG_INFINITY, f64::max) as f32
    });

    let clip_low = config.clip_low();
    let clip_high = config.clip_high();
    let rebin_offset = config.rebin_offset();
    let rebin_max = config.rebin_max();
    let rebin = |v: i16| (i32::from(v) + rebin_offset).clamp(0, rebin_max) as usize;

    let mut histogram_1d_freq_avg = Array3::zeros((npol, ndim, nbin));
    let mut rebinned_histogram_1d_freq_avg = Array3::zeros((npol, ndim, nrebin));
    let mut rebinned_histogram_2d_freq_avg = Array3::zeros((npol, nrebin, nrebin));
    let mut num_clipped_samples_spectrum = Array3::zeros((npol, ndim, nchan));
    for ((p, d, c, _), &v) in raw.indexed_iter() {
        histogram_1d_freq_avg[(p, d, (i32::from(v) - clip_low) as usize)] += 1;
        rebinned_histogram_1d_freq_avg[(p, d, rebin(v))] += 1;
        if i32::from(v) <= clip_low || i32::from(v) >= clip_high {
            num_clipped_samples_spectrum[(p, d, c)] += 1;
        }
    }
    let mut rebinned_histogram_2d_freq_avg_rfi_excised = Array3::zeros((npol, nrebin, nrebin));
    let mut histogram_1d_freq_avg_rfi_excised = Array3::zeros((npol, ndim, nbin));
    let mut rebinned_histogram_1d_freq_avg_rfi_excised = Array3::zeros((npol, ndim, nrebin));
    let is_rfi = {
        let mut flags = vec![true; nchan];
        for &c in non_rfi {
            flags[c] = false;
        }
        flags
    };
    for p in 0..npol {
        for c in 0..nchan {
            for s in 0..nsamp {
                let re = raw[(p, 0, c, s)];
                let im = raw[(p, 1, c, s)];
                rebinned_histogram_2d_freq_avg[(p, rebin(re), rebin(im))] += 1;
                if is_rfi[c] {
                    continue;
                }
                rebinned_histogram_2d_freq_avg_rfi_excised[(p, rebin(re), rebin(im))] += 1;
                for (d, v) in [re, im].into_iter().enumerate() {
                    histogram_1d_freq_avg_rfi_excised[(p, d, (i32::from(v) - clip_low) as usize)] +=
                        1;
                    rebinned_histogram_1d_freq_avg_rfi_excised[(p, d, rebin(v))] += 1;
                }
            }
        }
    }

    let num_clipped_samples = num_clipped_samples_spectrum.sum_axis(Axis(2));
    let num_clipped_samples_rfi_excised = Array2::from_shape_fn((npol, ndim), |(p, d)| {
        non_rfi
            .iter()
            .map(|&c| num_clipped_samples_spectrum[(p, d, c)])
            .sum::<u32>()
    });

    let freq_factor = config.freq_bin_factor();
    let time_factor = config.temporal_bin_factor();
    let spectrogram = Array3::from_shape_fn((npol, nfreq_bins, ntime_bins), |(p, f, t)| {
        power
            .slice(s![
                p,
                f * freq_factor..(f + 1) * freq_factor,
                t * time_factor..(t + 1) * time_factor
            ])
            .sum() as f32
    });

    let all_channels: Vec<usize> = (0..nchan).collect();
    let timeseries = timeseries_stats(&power, &all_channels, ntime_bins, time_factor);
    let timeseries_rfi_excised = timeseries_stats(&power, non_rfi, ntime_bins, time_factor);

    let data = Data {
        mean_frequency_avg,
        mean_frequency_avg_rfi_excised,
        variance_frequency_avg,
        variance_frequency_avg_rfi_excised,
        mean_spectrum: mean_spectrum.mapv(|v| v as f32),
        variance_spectrum: variance_spectrum.mapv(|v| v as f32),
        mean_spectral_power,
        max_spectral_power,
        histogram_1d_freq_avg,
        histogram_1d_freq_avg_rfi_excised,
        rebinned_histogram_2d_freq_avg,
        rebinned_histogram_2d_freq_avg_rfi_excised,
        rebinned_histogram_1d_freq_avg,
        rebinned_histogram_1d_freq_avg_rfi_excised,
        num_clipped_samples_spectrum,
        num_clipped_samples,
        num_clipped_samples_rfi_excised,
        spectrogram,
        timeseries,
        timeseries_rfi_excised,
    };

    let settings = config.settings();
    let low_freq = settings.frequency_mhz - settings.bandwidth_mhz / 2.0;
    GeneratedStats {
        channel_freq_mhz: bin_centres(low_freq, settings.bandwidth_mhz, nchan),
        frequency_bins: bin_centres(low_freq, settings.bandwidth_mhz, nfreq_bins),
        timeseries_bins: bin_centres(0.0, config.total_sample_time(), ntime_bins),
        data,
    }
}

/// [pol][time bin][max, min, mean] of the power in `channels`. NaN when
/// `channels` is empty.
fn timeseries_stats(
    power: &Array3<f64>,
    channels: &[usize],
    ntime_bins: usize,
    time_factor: usize,
) -> Array3<f32> {
    let npol = power.len_of(Axis(0));
    let mut out = Array3::from_elem((npol, ntime_bins, NUM_TIMESERIES_STATS), f32::NAN);
    if channels.is_empty() {
        return out;
    }

    for p in 0..npol {
        for t in 0..ntime_bins {
            let block = || {
                channels.iter().flat_map(move |&c| {
                    power
                        .slice(s![p, c, t * time_factor..(t + 1) * time_factor])
                        .to_vec()
                })
            };
            let max = block().fold(f64::NEG_INFINITY, f64::max);
            let min = block().fold(f64::INFINITY, f64::min);
            out[(p, t, TimeseriesDimension::Max.index())] = max as f32;
            out[(p, t, TimeseriesDimension::Min.index())] = min as f32;
            out[(p, t, TimeseriesDimension::Mean.index())] = mean(block()) as f32;
        }
    }
    out
}

/// The centres of `n` equal-width bins spanning [start, start + width).
fn bin_centres(start: f64, width: f64, n: usize) -> Vec<f64> {
    let step = width / n as f64;
    (0..n).map(|i| start + step * (i as f64 + 0.5)).collect()
}

/// NaN for no values.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Unbiased (N-1) variance. NaN for fewer than two values.
fn sample_variance(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean(values.iter().copied());
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum_sq / (values.len() - 1) as f64
}
