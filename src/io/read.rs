// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read STAT files.

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use itertools::Itertools;
use log::{debug, trace, warn};
use ndarray::{Array, ArrayD, Dimension as NdDimension, ShapeBuilder};
use npyz::{npz, AutoSerialize, Deserialize, NpyFile};
use zip::{result::ZipError, ZipArchive};

use super::{header, FormatError, StatReadError, SUPPORTED_FILE_FORMAT_VERSIONS};
use crate::{
    constants::FILE_FORMAT_VERSION_1_0_0, schema::*, stats::StatsError, Data, Metadata,
    Statistics,
};

/// Read a STAT file. The file handle is closed before this function returns,
/// regardless of the outcome.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Statistics, StatReadError> {
    let path = path.as_ref();
    debug!("Reading STAT file {}", path.display());
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StatReadError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let version = read_string(&mut archive, FILE_FORMAT_VERSION)?;
    if !SUPPORTED_FILE_FORMAT_VERSIONS.contains(&version.as_str()) {
        return Err(FormatError::UnsupportedVersion {
            got: version,
            supported: SUPPORTED_FILE_FORMAT_VERSIONS.iter().join(", "),
        }
        .into());
    }
    if version == FILE_FORMAT_VERSION_1_0_0 {
        warn!(
            "{} uses the legacy STAT format {version}; sample counts will be zero",
            path.display()
        );
    }

    let (_, header_bytes) = read_member::<u8, _>(&mut archive, HEADER)?;
    let metadata = header::decode(&header_bytes, &version)?;
    metadata.validate()?;
    trace!("{:#?}", metadata);

    let data = read_data(&mut archive, &metadata)?;
    Ok(Statistics::new(metadata, data)?)
}

fn read_data<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    m: &Metadata,
) -> Result<Data, StatReadError> {
    Ok(Data {
        mean_frequency_avg: read_array(archive, m, MEAN_FREQUENCY_AVG)?,
        mean_frequency_avg_rfi_excised: read_array(archive, m, MEAN_FREQUENCY_AVG_RFI_EXCISED)?,
        variance_frequency_avg: read_array(archive, m, VARIANCE_FREQUENCY_AVG)?,
        variance_frequency_avg_rfi_excised: read_array(
            archive,
            m,
            VARIANCE_FREQUENCY_AVG_RFI_EXCISED,
        )?,
        mean_spectrum: read_array(archive, m, MEAN_SPECTRUM)?,
        variance_spectrum: read_array(archive, m, VARIANCE_SPECTRUM)?,
        mean_spectral_power: read_array(archive, m, MEAN_SPECTRAL_POWER)?,
        max_spectral_power: read_array(archive, m, MAX_SPECTRAL_POWER)?,
        histogram_1d_freq_avg: read_array(archive, m, HISTOGRAM_1D_FREQ_AVG)?,
        histogram_1d_freq_avg_rfi_excised: read_array(
            archive,
            m,
            HISTOGRAM_1D_FREQ_AVG_RFI_EXCISED,
        )?,
        rebinned_histogram_2d_freq_avg: read_array(archive, m, HISTOGRAM_REBINNED_2D_FREQ_AVG)?,
        rebinned_histogram_2d_freq_avg_rfi_excised: read_array(
            archive,
            m,
            HISTOGRAM_REBINNED_2D_FREQ_AVG_RFI_EXCISED,
        )?,
        rebinned_histogram_1d_freq_avg: read_array(archive, m, HISTOGRAM_REBINNED_1D_FREQ_AVG)?,
        rebinned_histogram_1d_freq_avg_rfi_excised: read_array(
            archive,
            m,
            HISTOGRAM_REBINNED_1D_FREQ_AVG_RFI_EXCISED,
        )?,
        num_clipped_samples_spectrum: read_array(archive, m, NUM_CLIPPED_SAMPLES_SPECTRUM)?,
        num_clipped_samples: read_array(archive, m, NUM_CLIPPED_SAMPLES)?,
        num_clipped_samples_rfi_excised: read_array(archive, m, NUM_CLIPPED_SAMPLES_RFI_EXCISED)?,
        spectrogram: read_array(archive, m, SPECTROGRAM)?,
        timeseries: read_array(archive, m, TIMESERIES)?,
        timeseries_rfi_excised: read_array(archive, m, TIMESERIES_RFI_EXCISED)?,
    })
}

/// Read the array stored under `key`, checking it against the shape implied
/// by the header.
fn read_array<T, D, R>(
    archive: &mut ZipArchive<R>,
    metadata: &Metadata,
    key: &'static str,
) -> Result<Array<T, D>, StatReadError>
where
    T: Deserialize + AutoSerialize + Clone,
    D: NdDimension,
    R: Read + Seek,
{
    // Only data keys are passed in here.
    let expected = metadata.expected_shape(key).unwrap_or_default();
    let (shape, values) = read_member::<T, _>(archive, key)?;
    let bad_shape = |actual: Vec<usize>| StatsError::BadShape {
        key,
        expected: expected.clone(),
        actual,
    };
    if shape.dims != expected {
        return Err(bad_shape(shape.dims).into());
    }

    let true_shape = shape.dims.clone().set_f(shape.fortran);
    let array = ArrayD::from_shape_vec(true_shape, values)
        .map_err(|_| bad_shape(shape.dims.clone()))?
        .into_dimensionality::<D>()
        .map_err(|_| bad_shape(shape.dims))?;
    // Fortran-ordered arrays are given back in the standard layout.
    Ok(if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    })
}

fn read_string<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    key: &'static str,
) -> Result<String, StatReadError> {
    let (_, bytes) = read_member::<u8, _>(archive, key)?;
    String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { field: key }.into())
}

struct MemberShape {
    dims: Vec<usize>,
    fortran: bool,
}

/// Read the raw contents of an archive member, checking its dtype.
fn read_member<T, R>(
    archive: &mut ZipArchive<R>,
    key: &'static str,
) -> Result<(MemberShape, Vec<T>), StatReadError>
where
    T: Deserialize + AutoSerialize,
    R: Read + Seek,
{
    trace!("Reading {key}");
    let member = match archive.by_name(&npz::file_name_from_array_name(key)) {
        Ok(m) => m,
        Err(ZipError::FileNotFound) => return Err(FormatError::MissingKey { key }.into()),
        Err(e) => return Err(e.into()),
    };
    let npy = NpyFile::new(member).map_err(|e| bad_array(key, e))?;

    let expected_dtype = T::default_dtype();
    let dtype = npy.dtype();
    if dtype != expected_dtype {
        return Err(FormatError::BadDtype {
            key,
            expected: expected_dtype.descr(),
            actual: dtype.descr(),
        }
        .into());
    }

    let shape = MemberShape {
        dims: npy.shape().iter().map(|&d| d as usize).collect(),
        fortran: npy.order() == npyz::Order::Fortran,
    };
    let values = npy.into_vec::<T>().map_err(|e| bad_array(key, e))?;
    Ok((shape, values))
}

// Malformed npy headers and truncated payloads are format problems; anything
// else coming out of the file is a genuine IO error.
fn bad_array(key: &'static str, e: std::io::Error) -> StatReadError {
    match e.kind() {
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
            FormatError::BadArray {
                key,
                msg: e.to_string(),
            }
            .into()
        }
        _ => e.into(),
    }
}
