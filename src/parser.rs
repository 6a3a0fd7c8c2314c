// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/parser.rs - Record parser for relay card database files.
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
 * # `parser` Module
 *
 * This module classifies the lines of a relay card database file into typed
 * records. Each line is a `;`-separated record whose first field selects the
 * grammar:
 *
 * | Prefix | Record |
 * |---|---|
 * | `PILPXIDB<version>` | [Header] |
 * | `G` | generation number |
 * | `A` | [Architecture] |
 * | `S` | [SubunitDeclaration] |
 * | `R` | [RelayRecord] |
 *
 * Lines starting with `H` or `E` are comments. Lines with an unknown prefix,
 * or with a known prefix but a body that doesn't fit the grammar, produce no
 * record.
 *
 * ## Usage Example
 *
 * ```
 * use relaycard::parser::{LayerGroup, Record};
 *
 * let record = Record::from_line("R;L;S1BIT3;42").unwrap();
 * match record {
 *     Record::Relay(relay) => {
 *         assert_eq!(relay.group, LayerGroup::Logical);
 *         assert_eq!(relay.layer, 1);
 *         assert_eq!(relay.bit, 3);
 *         assert_eq!(relay.count, 42);
 *     }
 *     _ => unreachable!(),
 * }
 *
 * assert!(Record::from_line("H;comment").is_none());
 * ```
 */

use std::str::FromStr;

const HEADER_MAGIC: &str = "PILPXIDB";

/// The file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The file format version.
    pub version: u32,
    /// Free-form card description.
    pub card_info: String,
}

/// The card architecture: how many physical loops exist and their sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Architecture {
    /// The declared loop count.
    pub loop_count: u32,
    /// Description of the architecture.
    pub description: String,
    /// The declared number of physical loops.
    pub num_loops: u32,
    /// The bit capacity (row count) of each physical loop, in loop order.
    pub allocations: Vec<u32>,
}

/// A logical subunit declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubunitDeclaration {
    /// The 0-based subunit index as written in the file.
    pub index: u32,
    /// The subunit type code.
    pub subunit_type: u32,
    pub rows: u32,
    pub cols: u32,
    pub num_components: u32,
    pub u2: u32,
    pub description: String,
}

/// Which group of layers a relay record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerGroup {
    /// A logical subunit, written `L`.
    Logical,
    /// A physical loop, written `P`.
    Physical,
}

/// A relay switch count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRecord {
    pub group: LayerGroup,
    /// The 1-based subunit id for logical relays, or the 0-based loop id for
    /// physical relays.
    pub layer: u32,
    /// The 1-based BIT number within the layer.
    pub bit: u32,
    /// The switch count.
    pub count: u64,
}

/// A single classified line of a relay card database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(Header),
    Generation(u32),
    Architecture(Architecture),
    Subunit(SubunitDeclaration),
    Relay(RelayRecord),
}

impl Record {
    /// Classifies a single line of text.
    ///
    /// Returns `None` for blank lines, comments, and lines that don't match
    /// any record grammar.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut reader = reader_builder().from_reader(line.as_bytes());
        let record = reader.byte_records().next()?.ok()?;
        Self::from_fields(&decode_fields(&record))
    }

    /// Classifies a line that has already been split on `;`.
    ///
    /// Whitespace around each field is ignored, except inside the header's
    /// card info, which is kept as written.
    pub fn from_fields(raw: &[String]) -> Option<Self> {
        let fields: Vec<&str> = raw.iter().map(|field| field.trim()).collect();
        let fields = fields.as_slice();

        let first = fields.first()?;
        match first.chars().next()? {
            'H' | 'E' => None,
            'P' => parse_header(fields, raw),
            'G' => parse_generation(fields),
            'A' => parse_architecture(fields),
            'S' => parse_subunit(fields),
            'R' => parse_relay(fields),
            _ => None,
        }
    }
}

/// The record reader configuration shared by line and file parsing.
pub(crate) fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b';')
        .flexible(true)
        .has_headers(false)
        .quoting(false);
    builder
}

pub(crate) fn decode_fields(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).to_string())
        .collect()
}

fn parse_header(fields: &[&str], raw: &[String]) -> Option<Record> {
    if fields.len() < 2 {
        return None;
    }

    let version = parse_number(fields[0].strip_prefix(HEADER_MAGIC)?)?;
    // Everything after the first `;`, up to the end of the trimmed line.
    let card_info = raw[1..].join(";");
    Some(Record::Header(Header {
        version,
        card_info: card_info.trim_end().to_string(),
    }))
}

fn parse_generation(fields: &[&str]) -> Option<Record> {
    if fields[0] != "G" {
        return None;
    }

    Some(Record::Generation(parse_number(fields.get(1)?)?))
}

fn parse_architecture(fields: &[&str]) -> Option<Record> {
    if fields[0] != "A" || fields.len() < 5 {
        return None;
    }

    let description = non_empty(fields[2])?;
    if fields[4].is_empty() {
        return None;
    }

    let allocations = fields[4]
        .split(',')
        .map(|allocation| parse_number(allocation.trim()))
        .collect::<Option<Vec<u32>>>()?;

    Some(Record::Architecture(Architecture {
        loop_count: parse_number(&fields[1])?,
        description,
        num_loops: parse_number(&fields[3])?,
        allocations,
    }))
}

fn parse_subunit(fields: &[&str]) -> Option<Record> {
    if fields[0] != "S" || fields.len() < 8 {
        return None;
    }

    Some(Record::Subunit(SubunitDeclaration {
        index: parse_number(&fields[1])?,
        subunit_type: parse_number(&fields[2])?,
        rows: parse_number(&fields[3])?,
        cols: parse_number(&fields[4])?,
        num_components: parse_number(&fields[5])?,
        u2: parse_number(&fields[6])?,
        description: non_empty(fields[7])?,
    }))
}

fn parse_relay(fields: &[&str]) -> Option<Record> {
    if fields[0] != "R" || fields.len() < 4 {
        return None;
    }

    let group = match fields[1] {
        "L" => LayerGroup::Logical,
        "P" => LayerGroup::Physical,
        _ => return None,
    };

    // `S<id>BIT<bit>` or `L<id>BIT<bit>`
    let target = fields[2]
        .strip_prefix('S')
        .or_else(|| fields[2].strip_prefix('L'))?;
    let (layer, bit) = target.split_once("BIT")?;

    Some(Record::Relay(RelayRecord {
        group,
        layer: parse_number(layer)?,
        bit: parse_number(bit)?,
        count: parse_number(&fields[3])?,
    }))
}

/// Parses an unsigned decimal number made only of ASCII digits.
fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse::<T>().ok()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header() {
        assert_eq!(
            Record::from_line("PILPXIDB3;40-560-021 Rev 2"),
            Some(Record::Header(Header {
                version: 3,
                card_info: "40-560-021 Rev 2".to_string(),
            }))
        );
    }

    #[test]
    fn header_card_info_keeps_separators() {
        let record = Record::from_line("PILPXIDB1;Card;SN 42").unwrap();
        assert_eq!(
            record,
            Record::Header(Header {
                version: 1,
                card_info: "Card;SN 42".to_string(),
            })
        );
    }

    #[test]
    fn header_card_info_keeps_inner_whitespace() {
        let record = Record::from_line("PILPXIDB1;Card ; SN 42").unwrap();
        assert_eq!(
            record,
            Record::Header(Header {
                version: 1,
                card_info: "Card ; SN 42".to_string(),
            })
        );

        let fields = vec!["PILPXIDB1".to_string(), " Card  A  ".to_string()];
        assert_eq!(
            Record::from_fields(&fields),
            Some(Record::Header(Header {
                version: 1,
                card_info: " Card  A".to_string(),
            }))
        );
    }

    #[test]
    fn header_allows_empty_card_info() {
        let record = Record::from_line("PILPXIDB7;").unwrap();
        assert_eq!(
            record,
            Record::Header(Header {
                version: 7,
                card_info: String::new(),
            })
        );
    }

    #[test]
    fn header_without_magic_is_skipped() {
        assert_eq!(Record::from_line("PXXXXXDB3;card"), None);
        assert_eq!(Record::from_line("PILPXIDB3"), None);
        assert_eq!(Record::from_line("PILPXIDB;card"), None);
    }

    #[test]
    fn generation() {
        assert_eq!(Record::from_line("G;12"), Some(Record::Generation(12)));
        assert_eq!(Record::from_line("G;"), None);
        assert_eq!(Record::from_line("G;x"), None);
        assert_eq!(Record::from_line("GEN;12"), None);
    }

    #[test]
    fn architecture() {
        assert_eq!(
            Record::from_line("A;2;Desc;2;4,8"),
            Some(Record::Architecture(Architecture {
                loop_count: 2,
                description: "Desc".to_string(),
                num_loops: 2,
                allocations: vec![4, 8],
            }))
        );
    }

    #[test]
    fn architecture_with_bad_allocation_is_skipped() {
        assert_eq!(Record::from_line("A;2;Desc;2;4,x"), None);
        assert_eq!(Record::from_line("A;2;Desc;2;"), None);
        assert_eq!(Record::from_line("A;2;;2;4"), None);
        assert_eq!(Record::from_line("A;2;Desc;2"), None);
    }

    #[test]
    fn subunit() {
        assert_eq!(
            Record::from_line("S;0;1;2;2;5;0;Desc"),
            Some(Record::Subunit(SubunitDeclaration {
                index: 0,
                subunit_type: 1,
                rows: 2,
                cols: 2,
                num_components: 5,
                u2: 0,
                description: "Desc".to_string(),
            }))
        );
    }

    #[test]
    fn subunit_missing_fields_is_skipped() {
        assert_eq!(Record::from_line("S;0;1;2;2;5;0"), None);
        assert_eq!(Record::from_line("S;0;1;2;-2;5;0;Desc"), None);
    }

    #[test]
    fn relay_logical_and_physical() {
        assert_eq!(
            Record::from_line("R;L;S1BIT3;42"),
            Some(Record::Relay(RelayRecord {
                group: LayerGroup::Logical,
                layer: 1,
                bit: 3,
                count: 42,
            }))
        );
        assert_eq!(
            Record::from_line("R;P;L0BIT7;1000"),
            Some(Record::Relay(RelayRecord {
                group: LayerGroup::Physical,
                layer: 0,
                bit: 7,
                count: 1000,
            }))
        );
    }

    #[test]
    fn malformed_relays_are_skipped() {
        assert_eq!(Record::from_line("R;X;S1BIT3;42"), None);
        assert_eq!(Record::from_line("R;L;T1BIT3;42"), None);
        assert_eq!(Record::from_line("R;L;S1BT3;42"), None);
        assert_eq!(Record::from_line("R;L;S1BIT3;"), None);
        assert_eq!(Record::from_line("R;L;S1BIT3;+4"), None);
        assert_eq!(Record::from_line("R;L;S1BIT3"), None);
    }

    #[test]
    fn comments_and_unknown_prefixes() {
        assert_eq!(Record::from_line(""), None);
        assert_eq!(Record::from_line("   "), None);
        assert_eq!(Record::from_line("H;Relay database"), None);
        assert_eq!(Record::from_line("E;end"), None);
        assert_eq!(Record::from_line("L;0;16"), None);
        assert_eq!(Record::from_line("Z;1"), None);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            Record::from_line("  G ; 4  "),
            Some(Record::Generation(4))
        );
    }
}
