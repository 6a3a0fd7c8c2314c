// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/diff.rs - Relay count comparison for relay card database files.
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
 * # `diff` Module
 *
 * This module compares the relay counts of two cards.
 *
 * [DiffSummary::compare] pairs layers by position, not by id, and only looks
 * at the addresses recorded in the first card, so swapping the arguments can
 * give a different result. [compare_grid] compares one pair of layers cell by
 * cell over the first layer's whole grid.
 */

use std::fmt;

use serde::Serialize;

use crate::address::RelayAddress;
use crate::model::{CardModel, Layer};

/// Default absolute difference still treated as [CellDiffKind::Near].
pub const DEFAULT_NEAR_TOLERANCE: u64 = 10;

/// Match and mismatch counts for one group of layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffTally {
    pub matches: u64,
    pub mismatches: u64,
}

impl DiffTally {
    pub fn total(&self) -> u64 {
        self.matches + self.mismatches
    }

    fn add_layer<L: Layer + ?Sized>(&mut self, left: &L, right: &L) {
        let right = right.relays();
        for (address, count) in left.relays().iter() {
            if count == right.count(&address) {
                self.matches += 1;
            } else {
                self.mismatches += 1;
            }
        }
    }
}

impl fmt::Display for DiffTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matches, {} mismatches ({} total).",
            self.matches,
            self.mismatches,
            self.total()
        )
    }
}

/// The result of comparing two cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Tally over the logical subunits.
    pub subunits: DiffTally,
    /// Tally over the physical loops.
    pub physical_loops: DiffTally,
}

impl DiffSummary {
    /// Compares `left` against `right`.
    ///
    /// Layers are paired by position. When one card has more layers than the
    /// other, the extra layers are ignored. Every address recorded in a
    /// `left` layer is looked up in the paired `right` layer, where a missing
    /// address counts as zero.
    pub fn compare(left: &CardModel, right: &CardModel) -> Self {
        let mut summary = Self::default();

        for (a, b) in left.subunits.iter().zip(&right.subunits) {
            summary.subunits.add_layer(a, b);
        }
        for (a, b) in left.physical_loops.iter().zip(&right.physical_loops) {
            summary.physical_loops.add_layer(a, b);
        }

        summary
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Logical Subunits: {}", self.subunits)?;
        write!(f, "Physical Loops: {}", self.physical_loops)
    }
}

/// How two counts at the same address relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellDiffKind {
    Equal,
    /// Different, but within the tolerance.
    Near,
    Different,
}

/// One cell of a grid comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellDiff {
    pub address: RelayAddress,
    pub left: u64,
    pub right: u64,
    pub kind: CellDiffKind,
}

/// Compares every cell of `left`'s grid with the same cell in `right`.
///
/// Counts that aren't recorded are zero. Cells are produced lazily, row by
/// row.
pub fn compare_grid<'a>(
    left: &'a dyn Layer,
    right: &'a dyn Layer,
    tolerance: u64,
) -> impl Iterator<Item = CellDiff> + 'a {
    left.grid().map(move |address| {
        let a = left.relays().count(&address);
        let b = right.relays().count(&address);
        let kind = if a == b {
            CellDiffKind::Equal
        } else if a.abs_diff(b) <= tolerance {
            CellDiffKind::Near
        } else {
            CellDiffKind::Different
        };

        CellDiff {
            address,
            left: a,
            right: b,
            kind,
        }
    })
}
