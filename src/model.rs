// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/model.rs - Card model for relay card database files.
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
 * # `model` Module
 *
 * This module builds a [CardModel] from the records of a relay card database
 * file in a single forward pass.
 *
 * Declarations must come before the relay records that reference them: a
 * relay record naming a subunit or loop that hasn't been declared yet is
 * dropped.
 *
 * ## Usage Example
 *
 * ```no_run
 * use relaycard::model::{CardModel, Layer};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let card = CardModel::from_path("card.db")?;
 *
 *     for layer in card.layers() {
 *         println!("{}: {} recorded relays", layer.layer_ref(), layer.relays().len());
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::io::prelude::*;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use crate::address::{GridAddresses, RelayAddress, RelayMap};
use crate::error::Result;
use crate::parser::{
    self, Architecture, Header, LayerGroup, Record, RelayRecord, SubunitDeclaration,
};

/// Identifies a layer within a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayerRef {
    /// A logical subunit, by its 1-based layer id.
    Logical(u32),
    /// A physical loop, by its 0-based loop id.
    Physical(u32),
}

impl LayerRef {
    /// A human-readable label for a relay in this layer.
    pub fn relay_label(&self, address: &RelayAddress) -> String {
        match self {
            LayerRef::Logical(_) => format!("Bit ({}, {})", address.row + 1, address.col + 1),
            LayerRef::Physical(_) => format!("Bit {}", address.row + 1),
        }
    }
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerRef::Logical(id) => write!(f, "Logical Subunit {}", id),
            LayerRef::Physical(id) => write!(f, "Physical Loop {}", id),
        }
    }
}

/// A grid of relays with recorded switch counts.
pub trait Layer {
    fn layer_ref(&self) -> LayerRef;
    fn rows(&self) -> u32;
    fn cols(&self) -> u32;
    fn relays(&self) -> &RelayMap;

    /// The number of relay positions in the nominal `rows × cols` grid.
    fn area(&self) -> u64 {
        u64::from(self.rows()) * u64::from(self.cols())
    }

    /// Every address in the nominal grid, row by row.
    fn grid(&self) -> GridAddresses {
        GridAddresses::new(self.rows(), self.cols())
    }
}

/// A logical subunit: a matrix-addressed group of relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subunit {
    /// The 1-based layer id (declared index + 1).
    pub layer_id: u32,
    pub subunit_type: u32,
    pub rows: u32,
    pub cols: u32,
    pub num_components: u32,
    pub u2: u32,
    pub description: String,
    pub relays: RelayMap,
}

impl Layer for Subunit {
    fn layer_ref(&self) -> LayerRef {
        LayerRef::Logical(self.layer_id)
    }

    fn rows(&self) -> u32 {
        self.rows
    }

    fn cols(&self) -> u32 {
        self.cols
    }

    fn relays(&self) -> &RelayMap {
        &self.relays
    }
}

/// A physical loop: a single column of relays sized by the architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalLoop {
    /// The 0-based loop id (allocation index).
    pub loop_id: u32,
    pub rows: u32,
    pub relays: RelayMap,
}

impl PhysicalLoop {
    pub const COLS: u32 = 1;
}

impl Layer for PhysicalLoop {
    fn layer_ref(&self) -> LayerRef {
        LayerRef::Physical(self.loop_id)
    }

    fn rows(&self) -> u32 {
        self.rows
    }

    fn cols(&self) -> u32 {
        Self::COLS
    }

    fn relays(&self) -> &RelayMap {
        &self.relays
    }
}

/// What a source line contributed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSite {
    Header,
    Generation,
    Architecture,
    Subunit {
        layer_id: u32,
    },
    LogicalRelay {
        layer_id: u32,
        address: RelayAddress,
    },
    PhysicalRelay {
        loop_id: u32,
        address: RelayAddress,
    },
}

impl RecordSite {
    /// The layer this site belongs to, if it is a relay.
    pub fn layer_ref(&self) -> Option<LayerRef> {
        match *self {
            RecordSite::LogicalRelay { layer_id, .. } => Some(LayerRef::Logical(layer_id)),
            RecordSite::PhysicalRelay { loop_id, .. } => Some(LayerRef::Physical(loop_id)),
            _ => None,
        }
    }
}

/// Maps source line numbers to the records they produced, and back.
///
/// Only lines that changed the model have entries. Line numbers are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    by_line: HashMap<u64, RecordSite>,
    by_site: HashMap<RecordSite, u64>,
}

impl SourceMap {
    fn record(&mut self, line: u64, site: RecordSite) {
        self.by_line.insert(line, site);
        self.by_site.insert(site, line);
    }

    /// The record produced by `line`.
    pub fn site_at(&self, line: u64) -> Option<&RecordSite> {
        self.by_line.get(&line)
    }

    /// The last line that produced `site`.
    pub fn line_of(&self, site: &RecordSite) -> Option<u64> {
        self.by_site.get(site).copied()
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

/// A relay card, as described by one database file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardModel {
    pub header: Option<Header>,
    pub generation: Option<u32>,
    pub architecture: Option<Architecture>,
    /// Logical subunits, in declaration order.
    pub subunits: Vec<Subunit>,
    /// Physical loops, in allocation order.
    pub physical_loops: Vec<PhysicalLoop>,
    /// Which source line produced which part of the model.
    pub sources: SourceMap,
}

impl CardModel {
    /// Reads and parses the card database file at `path`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the parsed `CardModel`, or an error if the file
    /// couldn't be opened or read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses card database content from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut builder = CardModelBuilder::new();
        let mut reader = parser::reader_builder().from_reader(reader);

        for result in reader.byte_records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let fields = parser::decode_fields(&record);

            match Record::from_fields(&fields) {
                Some(record) => builder.push(record, line),
                None => trace!(line, "skipping line"),
            }
        }

        Ok(builder.build())
    }

    /// Parses card database content from a byte slice.
    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Self::from_reader(content)
    }

    /// The subunit with the given 1-based layer id.
    pub fn subunit(&self, layer_id: u32) -> Option<&Subunit> {
        self.subunits.iter().find(|s| s.layer_id == layer_id)
    }

    /// The physical loop with the given 0-based loop id.
    pub fn physical_loop(&self, loop_id: u32) -> Option<&PhysicalLoop> {
        self.physical_loops.iter().find(|l| l.loop_id == loop_id)
    }

    /// Looks up a layer by reference.
    pub fn layer(&self, layer_ref: LayerRef) -> Option<&dyn Layer> {
        match layer_ref {
            LayerRef::Logical(id) => self.subunit(id).map(|s| s as &dyn Layer),
            LayerRef::Physical(id) => self.physical_loop(id).map(|l| l as &dyn Layer),
        }
    }

    /// All layers: subunits first, then physical loops.
    pub fn layers(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.subunits
            .iter()
            .map(|s| s as &dyn Layer)
            .chain(self.physical_loops.iter().map(|l| l as &dyn Layer))
    }
}

/// Assembles a [CardModel] from records in file order.
#[derive(Debug, Default)]
pub struct CardModelBuilder {
    model: CardModel,
}

impl CardModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one record that was read from source line `line`.
    pub fn push(&mut self, record: Record, line: u64) {
        let site = match record {
            Record::Header(header) => {
                self.model.header = Some(header);
                Some(RecordSite::Header)
            }
            Record::Generation(generation) => {
                self.model.generation = Some(generation);
                Some(RecordSite::Generation)
            }
            Record::Architecture(architecture) => {
                self.push_architecture(architecture);
                Some(RecordSite::Architecture)
            }
            Record::Subunit(declaration) => Some(self.push_subunit(declaration)),
            Record::Relay(relay) => self.push_relay(&relay, line),
        };

        if let Some(site) = site {
            self.model.sources.record(line, site);
        }
    }

    fn push_architecture(&mut self, architecture: Architecture) {
        // A later architecture line replaces the loops of an earlier one.
        self.model.physical_loops.clear();
        for (index, &rows) in architecture.allocations.iter().enumerate() {
            let Ok(loop_id) = u32::try_from(index) else {
                break;
            };
            self.model.physical_loops.push(PhysicalLoop {
                loop_id,
                rows,
                relays: RelayMap::new(),
            });
        }
        self.model.architecture = Some(architecture);
    }

    fn push_subunit(&mut self, declaration: SubunitDeclaration) -> RecordSite {
        let layer_id = declaration.index.saturating_add(1);
        self.model.subunits.push(Subunit {
            layer_id,
            subunit_type: declaration.subunit_type,
            rows: declaration.rows,
            cols: declaration.cols,
            num_components: declaration.num_components,
            u2: declaration.u2,
            description: declaration.description,
            relays: RelayMap::new(),
        });
        RecordSite::Subunit { layer_id }
    }

    fn push_relay(&mut self, relay: &RelayRecord, line: u64) -> Option<RecordSite> {
        let (site, address) = match relay.group {
            LayerGroup::Logical => {
                let subunit = self
                    .model
                    .subunits
                    .iter_mut()
                    .find(|s| s.layer_id == relay.layer);
                let Some(subunit) = subunit else {
                    debug!(line, layer = relay.layer, "dropping relay for undeclared subunit");
                    return None;
                };
                let address = RelayAddress::resolve(relay.bit, subunit.cols)?;
                subunit.relays.insert(address, relay.count);
                let site = RecordSite::LogicalRelay {
                    layer_id: subunit.layer_id,
                    address,
                };
                (site, address)
            }
            LayerGroup::Physical => {
                let physical_loop = self
                    .model
                    .physical_loops
                    .iter_mut()
                    .find(|l| l.loop_id == relay.layer);
                let Some(physical_loop) = physical_loop else {
                    debug!(line, layer = relay.layer, "dropping relay for undeclared loop");
                    return None;
                };
                let address = RelayAddress::resolve(relay.bit, PhysicalLoop::COLS)?;
                physical_loop.relays.insert(address, relay.count);
                let site = RecordSite::PhysicalRelay {
                    loop_id: physical_loop.loop_id,
                    address,
                };
                (site, address)
            }
        };

        debug!(
            line,
            group = ?relay.group,
            layer = relay.layer,
            row = address.row,
            col = address.col,
            count = relay.count,
            "relay parsed"
        );
        Some(site)
    }

    /// Finishes the pass and returns the model.
    pub fn build(self) -> CardModel {
        debug!(
            subunits = self.model.subunits.len(),
            physical_loops = self.model.physical_loops.len(),
            "card model built"
        );
        self.model
    }
}
