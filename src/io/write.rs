// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write STAT files.

use std::{
    io::{BufWriter, Seek, Write},
    path::Path,
};

use log::{debug, trace};
use ndarray::{ArrayBase, Data as NdData, Dimension as NdDimension};
use npyz::{npz, AutoSerialize, WriterBuilder};
use tempfile::NamedTempFile;
use zip::ZipWriter;

use super::{header, StatWriteError};
use crate::{
    constants::CURRENT_FILE_FORMAT_VERSION,
    schema::{FILE_FORMAT_VERSION, HEADER},
    stats::DataArray,
    Data, Metadata, Statistics,
};

/// Write `metadata` and `data` to a STAT file at `path`, replacing anything
/// already there. Parent directories are created if necessary.
///
/// The statistics are checked for consistency before anything touches the
/// disk. The file is assembled next to its destination and only renamed into
/// place once complete, so `path` never holds a partially-written file.
pub fn write<P: AsRef<Path>>(
    path: P,
    metadata: &Metadata,
    data: &Data,
) -> Result<(), StatWriteError> {
    let path = path.as_ref();
    metadata.validate()?;
    data.validate(metadata)?;

    if metadata.file_format_version != CURRENT_FILE_FORMAT_VERSION {
        debug!(
            "Statistics from a version {} file will be written as version {}",
            metadata.file_format_version, CURRENT_FILE_FORMAT_VERSION
        );
    }

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    debug!("Writing STAT file {}", path.display());
    let tmp = NamedTempFile::new_in(dir)?;
    let mut zip = ZipWriter::new(BufWriter::new(tmp));

    let version = CURRENT_FILE_FORMAT_VERSION.as_bytes();
    write_member(&mut zip, FILE_FORMAT_VERSION, &[version.len()], version.iter())?;
    let header = header::encode(metadata)?;
    write_member(&mut zip, HEADER, &[header.len()], header.iter())?;

    for (key, array) in data.arrays() {
        match array {
            DataArray::F32(a) => write_array(&mut zip, key, &a)?,
            DataArray::U32(a) => write_array(&mut zip, key, &a)?,
        }
    }

    let tmp = zip
        .finish()?
        .into_inner()
        .map_err(|e| e.into_error())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a [`Statistics`] to a STAT file at `path`. See [`write`].
pub fn write_statistics<P: AsRef<Path>>(path: P, stats: &Statistics) -> Result<(), StatWriteError> {
    write(path, stats.metadata(), stats.data())
}

// The output is always C-order.
fn write_array<W, T, S, D>(
    zip: &mut ZipWriter<W>,
    key: &'static str,
    array: &ArrayBase<S, D>,
) -> Result<(), StatWriteError>
where
    W: Write + Seek,
    T: AutoSerialize,
    S: NdData<Elem = T>,
    D: NdDimension,
{
    write_member(zip, key, array.shape(), array.iter())
}

fn write_member<'a, W, T>(
    zip: &mut ZipWriter<W>,
    key: &'static str,
    shape: &[usize],
    values: impl Iterator<Item = &'a T>,
) -> Result<(), StatWriteError>
where
    W: Write + Seek,
    T: AutoSerialize + 'a,
{
    trace!("Writing {key} with shape {shape:?}");
    let shape: Vec<u64> = shape.iter().map(|&d| d as u64).collect();
    zip.start_file(npz::file_name_from_array_name(key), Default::default())?;
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(&mut *zip)
        .begin_nd()?;
    for v in values {
        writer.push(v)?;
    }
    writer.finish()?;
    Ok(())
}
