// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ndarray::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::generator::{
    calc_stats_with_rng, ScanIdentifiers, StatConfig, StatFileGenerator, StatSettings,
};

fn example_statistics() -> Statistics {
    let config = StatConfig::new(StatSettings {
        nchan: 6,
        nsamp: 4,
        nbit: 8,
        nfreq_bins: 3,
        ntime_bins: 2,
        nrebin: 8,
        start_chan: 10,
        ..Default::default()
    })
    .unwrap();
    let generated = calc_stats_with_rng(&config, &mut StdRng::seed_from_u64(100));
    StatFileGenerator::from_generated(config, ScanIdentifiers::default(), generated)
        .statistics()
        .clone()
}

#[test]
fn test_end_chan() {
    let stats = example_statistics();
    assert_eq!(stats.metadata().end_chan(), 15);

    let mut m = stats.metadata().clone();
    m.start_chan = 0;
    m.nchan = 0;
    assert_eq!(m.end_chan(), 0);

    // The last representable channel.
    m.start_chan = u32::MAX - 5;
    m.nchan = 6;
    assert_eq!(m.end_chan(), u32::MAX);
}

#[test]
fn test_channel_overflow_is_rejected() {
    let (mut metadata, data) = example_statistics().into_parts();
    metadata.start_chan = u32::MAX - 4;
    assert_eq!(metadata.end_chan(), u32::MAX);
    assert_eq!(
        Statistics::new(metadata.clone(), data.clone()),
        Err(StatsError::ChannelOverflow {
            start_chan: u32::MAX - 4,
            nchan: 6
        })
    );

    metadata.start_chan = u32::MAX - 5;
    assert!(Statistics::new(metadata, data).is_ok());

    assert_eq!(checked_end_chan(10, 6), Some(15));
    assert_eq!(checked_end_chan(u32::MAX, 1), Some(u32::MAX));
    assert_eq!(checked_end_chan(u32::MAX, 2), None);
}

#[test]
fn test_clip_low() {
    let stats = example_statistics();
    assert_eq!(stats.metadata().clip_low(), -128);
}

#[test]
fn test_expected_shapes() {
    let stats = example_statistics();
    let m = stats.metadata();
    assert_eq!(m.expected_shape(MEAN_FREQUENCY_AVG), Some(vec![2, 2]));
    assert_eq!(m.expected_shape(VARIANCE_SPECTRUM), Some(vec![2, 2, 6]));
    assert_eq!(m.expected_shape(MAX_SPECTRAL_POWER), Some(vec![2, 6]));
    assert_eq!(m.expected_shape(HISTOGRAM_1D_FREQ_AVG), Some(vec![2, 2, 256]));
    assert_eq!(
        m.expected_shape(HISTOGRAM_REBINNED_2D_FREQ_AVG),
        Some(vec![2, 8, 8])
    );
    assert_eq!(m.expected_shape(SPECTROGRAM), Some(vec![2, 3, 2]));
    assert_eq!(m.expected_shape(TIMESERIES_RFI_EXCISED), Some(vec![2, 2, 3]));
    assert_eq!(m.expected_shape(NCHAN), None);

    for key in DATA_KEYS {
        assert!(m.expected_shape(key).is_some(), "{key} has no shape");
    }
}

#[test]
fn test_accessors() {
    let stats = example_statistics();
    assert_eq!(stats.npol(), 2);
    assert_eq!(stats.ndim(), 2);
    assert_eq!(stats.nchan(), 6);

    let (metadata, data) = stats.clone().into_parts();
    assert_eq!(Statistics::new(metadata, data), Ok(stats));
}

#[test]
fn test_inconsistent_array_is_rejected() {
    let (metadata, mut data) = example_statistics().into_parts();
    data.mean_spectrum = Array3::zeros((2, 2, 5));
    assert_eq!(
        Statistics::new(metadata, data),
        Err(StatsError::BadShape {
            key: MEAN_SPECTRUM,
            expected: vec![2, 2, 6],
            actual: vec![2, 2, 5]
        })
    );
}

#[test]
fn test_inconsistent_header_vector_is_rejected() {
    let (mut metadata, data) = example_statistics().into_parts();
    metadata.frequency_bins.pop();
    assert_eq!(
        Statistics::new(metadata, data),
        Err(StatsError::BadShape {
            key: FREQUENCY_BINS,
            expected: vec![3],
            actual: vec![2]
        })
    );
}

#[test]
fn test_npol_must_be_two() {
    let (mut metadata, data) = example_statistics().into_parts();
    metadata.npol = 1;
    assert_eq!(
        Statistics::new(metadata, data),
        Err(StatsError::BadCount {
            key: NPOL,
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn test_changing_counts_changes_expected_shapes() {
    let (mut metadata, data) = example_statistics().into_parts();
    metadata.nrebin = 4;
    let result = data.validate(&metadata);
    assert_eq!(
        result,
        Err(StatsError::BadShape {
            key: HISTOGRAM_REBINNED_2D_FREQ_AVG,
            expected: vec![2, 4, 4],
            actual: vec![2, 8, 8]
        })
    );
}
