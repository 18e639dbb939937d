// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The `summary` subcommand.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};
use serde::Serialize;

use super::{common::parse_selection, PstStatError};
use crate::{
    io::read,
    schema::{dimension_text, polarisation_text},
    views::{frequency_averaged_stats, header, FrequencyAveragedRow, HeaderRow},
};

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct SummaryArgs {
    /// The STAT file to summarise.
    #[clap(name = "STAT_FILE", parse(from_os_str))]
    file: PathBuf,

    /// Only show this polarisation (0 = A, 1 = B).
    #[clap(long)]
    pol: Option<usize>,

    /// Only show this complex component (0 = real, 1 = imaginary).
    #[clap(long)]
    dim: Option<usize>,

    /// Only show statistics with (true) or without (false) RFI-flagged
    /// channels excised.
    #[clap(long)]
    rfi_excised: Option<bool>,

    /// Print JSON instead of a table. Log messages go to stderr so that stdout
    /// holds only the JSON document.
    #[clap(long)]
    pub(super) json: bool,
}

#[derive(Serialize)]
struct Summary {
    header: Vec<HeaderRow>,
    frequency_averaged: Vec<FrequencyAveragedRow>,
}

impl SummaryArgs {
    pub(super) fn run(self) -> Result<(), PstStatError> {
        let SummaryArgs {
            file,
            pol,
            dim,
            rfi_excised,
            json,
        } = self;
        let selection = parse_selection(pol, dim, rfi_excised)?;
        debug!("Selection: {selection:?}");

        let stats = read(&file)?;
        let summary = Summary {
            header: header(&stats),
            frequency_averaged: frequency_averaged_stats(&stats, selection),
        };

        if json {
            println!("{}", serde_json::to_string(&summary)?);
            return Ok(());
        }

        info!("{}:", file.display());
        let width = summary
            .header
            .iter()
            .map(|r| r.key.len())
            .max()
            .unwrap_or(0);
        for HeaderRow { key, value } in &summary.header {
            info!("  {key:width$}  {value}");
        }
        info!("");
        info!(
            "  {:>3} {:>4} {:>11} {:>14} {:>14} {:>10}",
            "pol", "dim", "rfi_excised", "mean", "variance", "clipped"
        );
        for row in &summary.frequency_averaged {
            info!(
                "  {:>3} {:>4} {:>11} {:>14.6} {:>14.6} {:>10}",
                polarisation_text(row.pol),
                dimension_text(row.dim),
                row.rfi_excised,
                row.mean,
                row.variance,
                row.num_clipped_samples
            );
        }

        Ok(())
    }
}
