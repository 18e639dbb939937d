// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to construct and parse the paths of STAT files.
//!
//! STAT files produced during a scan live at
//! `<base>/product/<eb_id>/<subsystem>/<scan_id>/monitoring_stats/<name>`,
//! where `<name>` is `<utc_start>_<obs_offset>_<file_number>.npz` with the
//! offset and file number zero padded to 16 and 6 digits.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{trace, warn};
use regex::Regex;
use thiserror::Error;

use crate::{constants::STAT_FILE_EXTENSION, Metadata};

/// Keys recognised by [`StatFilenameConstructor::from_map`].
pub const STAT_BASE_PATH_KEY: &str = "STAT_BASE_PATH";
pub const EB_ID_KEY: &str = "EB_ID";
pub const SCAN_ID_KEY: &str = "SCAN_ID";
pub const TELESCOPE_KEY: &str = "TELESCOPE";

lazy_static::lazy_static! {
    static ref RE_STAT_FILENAME: Regex =
        Regex::new(r"^(?P<utc>.+)_(?P<offset>\d+)_(?P<number>\d+)\.npz$").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatFilenameError {
    #[error("The STAT base path has not been set")]
    NoBasePath,

    #[error("The execution block ID has not been set")]
    NoEbId,

    #[error("The telescope (and therefore subsystem) has not been set")]
    NoSubsystem,

    #[error("The scan ID has not been set")]
    NoScanId,

    #[error("Telescope '{0}' does not map to a subsystem; expected SKALow or SKAMid")]
    UnknownTelescope(String),

    #[error("'{0}' is not a STAT file name (expected <utc_start>_<obs_offset>_<file_number>.{STAT_FILE_EXTENSION})")]
    Unparseable(String),
}

/// Get the subsystem directory name for a telescope.
pub fn subsystem_from_telescope(telescope: &str) -> Result<&'static str, StatFilenameError> {
    match telescope {
        "SKALow" => Ok("pst-low"),
        "SKAMid" => Ok("pst-mid"),
        _ => {
            warn!("Telescope {telescope} did not map to a subsystem path");
            Err(StatFilenameError::UnknownTelescope(telescope.to_string()))
        }
    }
}

/// Builds the path of a STAT file from the identifiers of its scan. Every
/// component must be set, and not empty, before
/// [`StatFilenameConstructor::get_filename`] can succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatFilenameConstructor {
    base_path: Option<PathBuf>,
    eb_id: Option<String>,
    subsystem: Option<&'static str>,
    scan_id: Option<String>,
}

impl StatFilenameConstructor {
    pub fn new() -> StatFilenameConstructor {
        StatFilenameConstructor::default()
    }

    /// Use the execution block, telescope and scan of `metadata`.
    pub fn from_metadata<P: AsRef<Path>>(
        base_path: P,
        metadata: &Metadata,
    ) -> Result<StatFilenameConstructor, StatFilenameError> {
        let mut c = StatFilenameConstructor::new();
        c.set_base_path(base_path);
        c.set_eb_id(&metadata.eb_id);
        c.set_telescope(&metadata.telescope)?;
        c.set_scan_id(metadata.scan_id);
        Ok(c)
    }

    /// Use whichever of `STAT_BASE_PATH`, `EB_ID`, `SCAN_ID` and `TELESCOPE`
    /// are present in `map`. Missing keys are left unset.
    pub fn from_map(
        map: &HashMap<String, String>,
    ) -> Result<StatFilenameConstructor, StatFilenameError> {
        let mut c = StatFilenameConstructor::new();
        if let Some(v) = map.get(STAT_BASE_PATH_KEY) {
            c.set_base_path(v);
        }
        if let Some(v) = map.get(EB_ID_KEY) {
            c.set_eb_id(v);
        }
        if let Some(v) = map.get(SCAN_ID_KEY) {
            c.set_scan_id(v);
        }
        if let Some(v) = map.get(TELESCOPE_KEY) {
            c.set_telescope(v)?;
        }
        Ok(c)
    }

    pub fn set_base_path<P: AsRef<Path>>(&mut self, base_path: P) {
        trace!("STAT base path: {}", base_path.as_ref().display());
        self.base_path = Some(base_path.as_ref().to_path_buf());
    }

    pub fn set_eb_id(&mut self, eb_id: &str) {
        trace!("Execution block ID: {eb_id}");
        self.eb_id = Some(eb_id.to_string());
    }

    pub fn set_scan_id<S: ToString>(&mut self, scan_id: S) {
        let scan_id = scan_id.to_string();
        trace!("Scan ID: {scan_id}");
        self.scan_id = Some(scan_id);
    }

    pub fn set_telescope(&mut self, telescope: &str) -> Result<(), StatFilenameError> {
        self.subsystem = Some(subsystem_from_telescope(telescope)?);
        Ok(())
    }

    /// Get the full path of a STAT file.
    pub fn get_filename(
        &self,
        utc_start: &str,
        obs_offset: u64,
        file_number: u64,
    ) -> Result<PathBuf, StatFilenameError> {
        // Empty components count as unset.
        let base_path = self
            .base_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(StatFilenameError::NoBasePath)?;
        let eb_id = self
            .eb_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(StatFilenameError::NoEbId)?;
        let subsystem = self.subsystem.ok_or(StatFilenameError::NoSubsystem)?;
        let scan_id = self
            .scan_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(StatFilenameError::NoScanId)?;

        Ok(base_path
            .join("product")
            .join(eb_id)
            .join(subsystem)
            .join(scan_id)
            .join("monitoring_stats")
            .join(format!(
                "{utc_start}_{obs_offset:016}_{file_number:06}.{STAT_FILE_EXTENSION}"
            )))
    }
}

/// The components of a STAT file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFilename {
    pub utc_start: String,
    pub obs_offset: u64,
    pub file_number: u64,
}

/// Recover the UTC start, observation offset and file number from the name
/// of a STAT file. Any directories are ignored.
pub fn parse_stat_filename<P: AsRef<Path>>(path: P) -> Result<StatFilename, StatFilenameError> {
    let path = path.as_ref();
    let unparseable = || StatFilenameError::Unparseable(path.display().to_string());
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(unparseable)?;
    let caps = RE_STAT_FILENAME.captures(name).ok_or_else(unparseable)?;
    Ok(StatFilename {
        utc_start: caps["utc"].to_string(),
        obs_offset: caps["offset"].parse().map_err(|_| unparseable())?,
        file_number: caps["number"].parse().map_err(|_| unparseable())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC: &str = "2023-10-23-11:00:00";

    fn expected() -> PathBuf {
        PathBuf::from("/tmp/product/eb-m001-20230921-245/pst-low/12345/monitoring_stats/2023-10-23-11:00:00_0000000000001024_000003.npz")
    }

    #[test]
    fn test_subsystems() {
        assert_eq!(subsystem_from_telescope("SKALow"), Ok("pst-low"));
        assert_eq!(subsystem_from_telescope("SKAMid"), Ok("pst-mid"));
        assert_eq!(
            subsystem_from_telescope("BadNameOfTelescope"),
            Err(StatFilenameError::UnknownTelescope(
                "BadNameOfTelescope".to_string()
            ))
        );
    }

    #[test]
    fn test_every_component_is_required() {
        let mut c = StatFilenameConstructor::new();
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoBasePath)
        );
        c.set_base_path("/tmp");
        assert_eq!(c.get_filename(UTC, 1024, 3), Err(StatFilenameError::NoEbId));
        c.set_eb_id("eb-m001-20230921-245");
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoSubsystem)
        );
        c.set_telescope("SKALow").unwrap();
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoScanId)
        );
        c.set_scan_id(12345);
        assert_eq!(c.get_filename(UTC, 1024, 3), Ok(expected()));
    }

    #[test]
    fn test_empty_components_are_unset() {
        let mut c = StatFilenameConstructor::new();
        c.set_base_path("/base");
        c.set_eb_id("");
        c.set_telescope("SKALow").unwrap();
        c.set_scan_id(7);
        assert_eq!(c.get_filename(UTC, 1024, 3), Err(StatFilenameError::NoEbId));

        c.set_eb_id("eb-m001-20230921-245");
        c.set_scan_id("");
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoScanId)
        );

        c.set_scan_id(7);
        c.set_base_path("");
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoBasePath)
        );

        c.set_base_path("/base");
        assert!(c.get_filename(UTC, 1024, 3).is_ok());
    }

    #[test]
    fn test_from_metadata_without_eb_id() {
        use crate::generator::{
            calc_stats_with_rng, ScanIdentifiers, StatConfig, StatFileGenerator, StatSettings,
        };
        use rand::{rngs::StdRng, SeedableRng};

        let config = StatConfig::new(StatSettings {
            nchan: 2,
            nsamp: 2,
            nbit: 8,
            nfreq_bins: 1,
            ntime_bins: 1,
            nrebin: 4,
            ..Default::default()
        })
        .unwrap();
        let generated = calc_stats_with_rng(&config, &mut StdRng::seed_from_u64(1));
        let mut metadata =
            StatFileGenerator::from_generated(config, ScanIdentifiers::default(), generated)
                .statistics()
                .metadata()
                .clone();
        // The generator's default execution block ID is empty.
        assert!(metadata.eb_id.is_empty());
        let c = StatFilenameConstructor::from_metadata("/base", &metadata).unwrap();
        assert_eq!(c.get_filename(UTC, 0, 0), Err(StatFilenameError::NoEbId));

        metadata.eb_id = "eb-m001-20230921-245".to_string();
        metadata.scan_id = 12345;
        let c = StatFilenameConstructor::from_metadata("/tmp", &metadata).unwrap();
        assert_eq!(c.get_filename(UTC, 1024, 3), Ok(expected()));
    }

    #[test]
    fn test_from_map() {
        let map = HashMap::from([
            ("STAT_BASE_PATH".to_string(), "/tmp".to_string()),
            ("EB_ID".to_string(), "eb-m001-20230921-245".to_string()),
            ("SCAN_ID".to_string(), "12345".to_string()),
            ("TELESCOPE".to_string(), "SKALow".to_string()),
            ("UNRELATED".to_string(), "whatever".to_string()),
        ]);
        let c = StatFilenameConstructor::from_map(&map).unwrap();
        assert_eq!(c.get_filename(UTC, 1024, 3), Ok(expected()));

        let c = StatFilenameConstructor::from_map(&HashMap::new()).unwrap();
        assert_eq!(
            c.get_filename(UTC, 1024, 3),
            Err(StatFilenameError::NoBasePath)
        );

        let map = HashMap::from([("TELESCOPE".to_string(), "MWA".to_string())]);
        assert!(matches!(
            StatFilenameConstructor::from_map(&map),
            Err(StatFilenameError::UnknownTelescope(_))
        ));
    }

    #[test]
    fn test_parse_stat_filename() {
        let parsed = parse_stat_filename(expected()).unwrap();
        assert_eq!(
            parsed,
            StatFilename {
                utc_start: UTC.to_string(),
                obs_offset: 1024,
                file_number: 3,
            }
        );

        for bad in [
            "stats.npz",
            "2023-10-23-11:00:00_0000000000001024_000003.h5",
            "/tmp/",
            "2023-10-23-11:00:00_99999999999999999999999_000003.npz",
        ] {
            assert!(
                parse_stat_filename(bad).is_err(),
                "{bad} shouldn't have parsed"
            );
        }
    }
}
