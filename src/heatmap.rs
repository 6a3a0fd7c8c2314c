// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/heatmap.rs - Relay count severity classes for relay card database files.
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

use serde::{Deserialize, Serialize};

use crate::address::RelayAddress;
use crate::model::Layer;

/// How worn a relay is, based on its switch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// The relay has never switched.
    None,
    Ok,
    Warning,
    Critical,
}

/// Upper bounds (inclusive) of the [Severity::Ok] and [Severity::Warning]
/// classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapThresholds {
    pub ok_max: u64,
    pub warning_max: u64,
}

impl Default for HeatmapThresholds {
    fn default() -> Self {
        Self {
            ok_max: 1_000_000,
            warning_max: 1_000_000_000,
        }
    }
}

impl HeatmapThresholds {
    /// Classifies a switch count.
    pub fn classify(&self, value: u64) -> Severity {
        if value == 0 {
            Severity::None
        } else if value <= self.ok_max {
            Severity::Ok
        } else if value <= self.warning_max {
            Severity::Warning
        } else {
            Severity::Critical
        }
    }
}

/// Classifies every cell of a layer's grid, row by row.
///
/// Cells without a recorded count are [Severity::None]. Cells are produced
/// lazily, so callers decide how much of a large grid to walk.
pub fn classify_layer<'a>(
    layer: &'a dyn Layer,
    thresholds: &'a HeatmapThresholds,
) -> impl Iterator<Item = (RelayAddress, Severity)> + 'a {
    let relays = layer.relays();
    layer
        .grid()
        .map(move |address| (address, thresholds.classify(relays.count(&address))))
}
