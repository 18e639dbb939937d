// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to serialize the single header record of a STAT file.
//!
//! All values are little endian and appear in [`crate::schema::HEADER_KEYS`]
//! order (the format version is stored separately and isn't part of the
//! record). Strings are a `u32` byte count followed by UTF-8 bytes. Vectors
//! are a `u64` element count followed by the elements. The sample-count
//! fields at the end are only present in the extended format.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::FormatError;
use crate::{constants::FILE_FORMAT_VERSION_1_0_0, schema::*, Metadata};

/// Serialize the header record of `metadata` in the extended layout.
pub(super) fn encode(metadata: &Metadata) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(
        256 + 8 * (metadata.channel_freq_mhz.len()
            + metadata.frequency_bins.len()
            + metadata.timeseries_bins.len())
            + 4 * metadata.num_samples_spectrum.len(),
    );

    write_str(&mut buf, &metadata.eb_id)?;
    write_str(&mut buf, &metadata.telescope)?;
    buf.write_u64::<LittleEndian>(metadata.scan_id)?;
    write_str(&mut buf, &metadata.beam_id)?;
    write_str(&mut buf, &metadata.utc_start)?;
    for v in [
        metadata.t_min,
        metadata.t_max,
        metadata.frequency_mhz,
        metadata.bandwidth_mhz,
    ] {
        buf.write_f64::<LittleEndian>(v)?;
    }
    for v in [
        metadata.start_chan,
        metadata.npol,
        metadata.ndim,
        metadata.nchan,
        metadata.nchan_ds,
        metadata.ndat_ds,
        metadata.histogram_nbin,
        metadata.nrebin,
    ] {
        buf.write_u32::<LittleEndian>(v)?;
    }
    write_f64s(&mut buf, &metadata.channel_freq_mhz)?;
    write_f64s(&mut buf, &metadata.frequency_bins)?;
    write_f64s(&mut buf, &metadata.timeseries_bins)?;

    buf.write_u32::<LittleEndian>(metadata.num_samples)?;
    buf.write_u32::<LittleEndian>(metadata.num_samples_rfi_excised)?;
    buf.write_u64::<LittleEndian>(metadata.num_samples_spectrum.len() as u64)?;
    for &v in &metadata.num_samples_spectrum {
        buf.write_u32::<LittleEndian>(v)?;
    }
    buf.write_u32::<LittleEndian>(metadata.num_invalid_packets)?;

    Ok(buf)
}

/// Deserialize a header record. `version` determines whether the extended
/// fields are expected; in the legacy layout, they are all zero.
pub(super) fn decode(bytes: &[u8], version: &str) -> Result<Metadata, FormatError> {
    let mut r = HeaderReader { bytes };

    let eb_id = r.string(EB_ID)?;
    let telescope = r.string(TELESCOPE)?;
    let scan_id = r.u64(SCAN_ID)?;
    let beam_id = r.string(BEAM_ID)?;
    let utc_start = r.string(UTC_START)?;
    let t_min = r.f64(T_MIN)?;
    let t_max = r.f64(T_MAX)?;
    let frequency_mhz = r.f64(FREQ)?;
    let bandwidth_mhz = r.f64(BW)?;
    let start_chan = r.u32(START_CHAN)?;
    let npol = r.u32(NPOL)?;
    let ndim = r.u32(NDIM)?;
    let nchan = r.u32(NCHAN)?;
    let nchan_ds = r.u32(NCHAN_DS)?;
    let ndat_ds = r.u32(NDAT_DS)?;
    let histogram_nbin = r.u32(NBIN_HIST)?;
    let nrebin = r.u32(NREBIN)?;
    let channel_freq_mhz = r.f64s(CHAN_FREQ)?;
    let frequency_bins = r.f64s(FREQUENCY_BINS)?;
    let timeseries_bins = r.f64s(TIMESERIES_BINS)?;

    let (num_samples, num_samples_rfi_excised, num_samples_spectrum, num_invalid_packets) =
        if version == FILE_FORMAT_VERSION_1_0_0 {
            (0, 0, vec![0; nchan as usize], 0)
        } else {
            (
                r.u32(NUM_SAMPLES)?,
                r.u32(NUM_SAMPLES_RFI_EXCISED)?,
                r.u32s(NUM_SAMPLES_SPECTRUM)?,
                r.u32(NUM_INVALID_PACKETS)?,
            )
        };

    if !r.bytes.is_empty() {
        return Err(FormatError::TrailingHeaderBytes(r.bytes.len()));
    }

    Ok(Metadata {
        file_format_version: version.to_string(),
        eb_id,
        telescope,
        scan_id,
        beam_id,
        utc_start,
        t_min,
        t_max,
        frequency_mhz,
        bandwidth_mhz,
        start_chan,
        npol,
        ndim,
        nchan,
        nchan_ds,
        ndat_ds,
        histogram_nbin,
        nrebin,
        channel_freq_mhz,
        frequency_bins,
        timeseries_bins,
        num_samples,
        num_samples_rfi_excised,
        num_samples_spectrum,
        num_invalid_packets,
    })
}

fn write_str(buf: &mut Vec<u8>, s: &str) -> std::io::Result<()> {
    buf.write_u32::<LittleEndian>(s.len() as u32)?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_f64s(buf: &mut Vec<u8>, values: &[f64]) -> std::io::Result<()> {
    buf.write_u64::<LittleEndian>(values.len() as u64)?;
    for &v in values {
        buf.write_f64::<LittleEndian>(v)?;
    }
    Ok(())
}

/// Reads header fields off the front of a byte slice. Running out of bytes
/// is reported against the field being read.
struct HeaderReader<'a> {
    bytes: &'a [u8],
}

impl<'a> HeaderReader<'a> {
    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], FormatError> {
        if self.bytes.len() < len {
            return Err(FormatError::TruncatedHeader { field });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    /// Read a count of elements which each have `elem_size` bytes, making
    /// sure that there are enough bytes left for all of them.
    fn count(&mut self, field: &'static str, elem_size: usize) -> Result<usize, FormatError> {
        let n = self.u64(field)?;
        match usize::try_from(n).ok().and_then(|n| n.checked_mul(elem_size)) {
            Some(len) if len <= self.bytes.len() => Ok(n as usize),
            _ => Err(FormatError::TruncatedHeader { field }),
        }
    }

    fn string(&mut self, field: &'static str) -> Result<String, FormatError> {
        let len = self.u32(field)? as usize;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8 { field })
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        self.bytes
            .read_u32::<LittleEndian>()
            .map_err(|_| FormatError::TruncatedHeader { field })
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, FormatError> {
        self.bytes
            .read_u64::<LittleEndian>()
            .map_err(|_| FormatError::TruncatedHeader { field })
    }

    fn f64(&mut self, field: &'static str) -> Result<f64, FormatError> {
        self.bytes
            .read_f64::<LittleEndian>()
            .map_err(|_| FormatError::TruncatedHeader { field })
    }

    fn f64s(&mut self, field: &'static str) -> Result<Vec<f64>, FormatError> {
        let n = self.count(field, 8)?;
        let mut values = vec![0.0; n];
        self.bytes
            .read_f64_into::<LittleEndian>(&mut values)
            .map_err(|_| FormatError::TruncatedHeader { field })?;
        Ok(values)
    }

    fn u32s(&mut self, field: &'static str) -> Result<Vec<u32>, FormatError> {
        let n = self.count(field, 4)?;
        let mut values = vec![0; n];
        self.bytes
            .read_u32_into::<LittleEndian>(&mut values)
            .map_err(|_| FormatError::TruncatedHeader { field })?;
        Ok(values)
    }
}
