// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Parser and analysis library for relay card database files.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `relaycard` Crate
 *
 * A library for parsing relay card database files and analyzing the relay
 * switch counts they contain.
 *
 * A card database describes the logical subunits and physical loops of a
 * relay switching card, and records how many times each relay has switched.
 * This crate provides a pipeline for working with these files:
 *
 * 1. [parser]: Classifies each line into a typed record.
 * 2. [model]: Assembles the records into a [model::CardModel].
 * 3. [statistics], [diff] and [heatmap]: Analyze a model, or a pair of
 *    models.
 *
 * ## Usage Example
 *
 * ```no_run
 * use relaycard::heatmap::HeatmapThresholds;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Parse two snapshots of the same card
 *     let before = relaycard::parse("before.db")?;
 *     let after = relaycard::parse("after.db")?;
 *
 *     // Summarize each logical subunit
 *     for subunit in &after.subunits {
 *         let record = relaycard::summarize(subunit);
 *         println!("Subunit {}: peak {}, mean {}", subunit.layer_id, record.peak, record.mean);
 *     }
 *
 *     // Compare the snapshots
 *     println!("{}", relaycard::compare(&before, &after));
 *
 *     // Classify a count
 *     let severity = relaycard::classify(2_500_000, &HeatmapThresholds::default());
 *     println!("{:?}", severity);
 *
 *     Ok(())
 * }
 * ```
 */

use std::path::Path;

pub mod address;
pub mod diff;
pub mod error;
pub mod heatmap;
pub mod model;
pub mod parser;
pub mod statistics;

pub use error::{Error, Result};

use diff::DiffSummary;
use heatmap::{HeatmapThresholds, Severity};
use model::{CardModel, Layer};
use statistics::StatRecord;

/// Reads and parses the card database file at `path`.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<CardModel> {
    CardModel::from_path(path)
}

/// Computes descriptive statistics for one layer.
pub fn summarize<L: Layer + ?Sized>(layer: &L) -> StatRecord {
    StatRecord::from_layer(layer)
}

/// Compares two cards layer by layer.
pub fn compare(left: &CardModel, right: &CardModel) -> DiffSummary {
    DiffSummary::compare(left, right)
}

/// Classifies a switch count into a severity class.
pub fn classify(value: u64, thresholds: &HeatmapThresholds) -> Severity {
    thresholds.classify(value)
}
