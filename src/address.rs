// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/address.rs - Relay addressing for relay card database files.
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
 * # `address` Module
 *
 * Relays are named in the source text by a 1-based linear "BIT" number. This
 * module translates BIT numbers into 0-based `(row, col)` addresses and
 * provides the sparse map that holds per-address switch counts.
 */

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// A 0-based relay position within a layer.
///
/// Two addresses are equal (and hash equally) when both `row` and `col` are
/// equal. Physical loop addresses always have `col == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelayAddress {
    /// The 0-based row.
    pub row: u32,
    /// The 0-based column.
    pub col: u32,
}

impl RelayAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Translates a 1-based BIT number into an address for a layer with
    /// `cols` columns.
    ///
    /// No bounds checking is done against the layer's row count, so a BIT
    /// number past the end of the layer yields a row past the end of the
    /// layer. Returns `None` when `bit` or `cols` is zero.
    pub fn resolve(bit: u32, cols: u32) -> Option<Self> {
        if bit == 0 || cols == 0 {
            return None;
        }

        let index = bit - 1;
        Some(Self {
            row: index / cols,
            col: index % cols,
        })
    }

    /// The 1-based BIT number of this address in a layer with `cols` columns.
    pub fn bit(&self, cols: u32) -> u64 {
        u64::from(self.row) * u64::from(cols) + u64::from(self.col) + 1
    }
}

impl fmt::Display for RelayAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major iterator over every address of a `rows` x `cols` grid.
///
/// Addresses are produced on demand, so a grid with very large dimensions
/// costs nothing until it is walked.
#[derive(Debug, Clone)]
pub struct GridAddresses {
    rows: u32,
    cols: u32,
    next: Option<RelayAddress>,
}

impl GridAddresses {
    pub fn new(rows: u32, cols: u32) -> Self {
        let next = (rows > 0 && cols > 0).then(|| RelayAddress::new(0, 0));
        Self { rows, cols, next }
    }

    /// The number of addresses in the whole grid.
    pub fn area(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

impl Iterator for GridAddresses {
    type Item = RelayAddress;

    fn next(&mut self) -> Option<RelayAddress> {
        let current = self.next?;
        self.next = if current.col + 1 < self.cols {
            Some(RelayAddress::new(current.row, current.col + 1))
        } else if current.row + 1 < self.rows {
            Some(RelayAddress::new(current.row + 1, 0))
        } else {
            None
        };
        Some(current)
    }
}

/// Sparse mapping from relay address to switch count.
///
/// Iteration follows the order in which addresses were first inserted.
/// Overwriting an address keeps its original position. An address that has
/// never been inserted has an implicit count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayMap {
    counts: IndexMap<RelayAddress, u64>,
}

impl RelayMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count for `address`, replacing any earlier value.
    pub fn insert(&mut self, address: RelayAddress, count: u64) {
        self.counts.insert(address, count);
    }

    /// The recorded count for `address`, if any.
    pub fn get(&self, address: &RelayAddress) -> Option<u64> {
        self.counts.get(address).copied()
    }

    /// The count for `address`, treating absent addresses as zero.
    pub fn count(&self, address: &RelayAddress) -> u64 {
        self.get(address).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(address, count)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RelayAddress, u64)> + '_ {
        self.counts.iter().map(|(&address, &count)| (address, count))
    }

    /// Iterates over the recorded counts in insertion order.
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }
}
