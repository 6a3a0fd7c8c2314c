// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/statistics.rs - Relay count statistics for relay card database files.
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
 * # `statistics` Module
 *
 * This module computes descriptive statistics over the recorded relay counts
 * of a layer.
 *
 * Only recorded addresses are sampled: a relay that never appeared in the
 * file is not counted as a zero. Every metric is zero for a layer with no
 * recorded relays.
 *
 * ## Usage Example
 *
 * ```no_run
 * use relaycard::model::CardModel;
 * use relaycard::statistics::CardStatistics;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let card = CardModel::from_path("card.db")?;
 *     let statistics = CardStatistics::from_model(&card);
 *
 *     for record in &statistics.layers {
 *         println!("{}: peak {}, mean {}", record.layer, record.peak, record.mean);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::address::RelayAddress;
use crate::model::{CardModel, Layer, LayerRef};

/// Number of decimal places kept in rounded metrics.
const DECIMAL_PLACES: u32 = 2;

/// How many of the highest-count relays are reported.
pub const TOP_RELAYS: usize = 5;

/// Descriptive statistics for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    /// The layer these statistics describe.
    pub layer: LayerRef,
    /// Number of recorded relay addresses.
    pub recorded: usize,
    /// Highest recorded count.
    pub peak: u64,
    /// Sum of all recorded counts.
    pub total: u64,
    /// The highest-count relays, highest first. Ties keep file order.
    pub top: Vec<(RelayAddress, u64)>,
    /// Arithmetic mean of the recorded counts.
    pub mean: Decimal,
    /// Percentage of the layer's grid with a nonzero recorded count.
    pub utilization: Decimal,
    /// Sample standard deviation of the recorded counts.
    pub std_dev: Decimal,
    /// The most frequent recorded count. Ties go to the first seen.
    pub most_common_count: u64,
    /// Fraction of the layer's grid with a nonzero recorded count.
    pub density: Decimal,
}

impl StatRecord {
    /// Computes statistics for a layer.
    pub fn from_layer<L: Layer + ?Sized>(layer: &L) -> Self {
        let relays = layer.relays();
        let counts: Vec<u64> = relays.counts().collect();

        let nonzero = counts.iter().filter(|&&count| count > 0).count();
        let area = layer.area();

        let density = ratio(nonzero, area);
        let utilization = if counts.is_empty() {
            Decimal::ZERO
        } else {
            percentage(nonzero, area)
        };

        Self {
            layer: layer.layer_ref(),
            recorded: counts.len(),
            peak: counts.iter().copied().max().unwrap_or(0),
            total: counts.iter().fold(0u64, |sum, &count| sum.saturating_add(count)),
            top: top_relays(relays.iter().collect()),
            mean: mean(&counts),
            utilization,
            std_dev: sample_std_dev(&counts),
            most_common_count: most_common(&counts),
            density,
        }
    }

    /// Human-readable labels for the [StatRecord::top] relays.
    pub fn top_labels(&self) -> Vec<String> {
        self.top
            .iter()
            .map(|(address, _)| self.layer.relay_label(address))
            .collect()
    }
}

/// Statistics for every layer of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStatistics {
    /// One record per layer: subunits first, then physical loops.
    pub layers: Vec<StatRecord>,
    /// Highest recorded count across the whole card.
    pub peak: u64,
    /// Sum of every recorded count across the whole card.
    pub total: u64,
}

impl CardStatistics {
    pub fn from_model(model: &CardModel) -> Self {
        let layers: Vec<StatRecord> = model
            .layers()
            .map(|layer| StatRecord::from_layer(layer))
            .collect();
        let peak = layers.iter().map(|record| record.peak).max().unwrap_or(0);
        let total = layers
            .iter()
            .fold(0u64, |sum, record| sum.saturating_add(record.total));

        Self {
            layers,
            peak,
            total,
        }
    }
}

fn top_relays(mut entries: Vec<(RelayAddress, u64)>) -> Vec<(RelayAddress, u64)> {
    // Stable sort, so equal counts stay in insertion order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(TOP_RELAYS);
    entries
}

fn mean(counts: &[u64]) -> Decimal {
    if counts.is_empty() {
        return Decimal::ZERO;
    }

    let sum = counts.iter().map(|&count| count as f64).sum::<f64>();
    round(sum / counts.len() as f64)
}

fn sample_std_dev(counts: &[u64]) -> Decimal {
    if counts.len() <= 1 {
        return Decimal::ZERO;
    }

    let n = counts.len() as f64;
    let mean = counts.iter().map(|&count| count as f64).sum::<f64>() / n;
    let squares: f64 = counts
        .iter()
        .map(|&count| {
            let deviation = count as f64 - mean;
            deviation * deviation
        })
        .sum();

    round((squares / (n - 1.0)).sqrt())
}

fn most_common(counts: &[u64]) -> u64 {
    let mut frequencies: HashMap<u64, usize> = HashMap::new();
    for &count in counts {
        *frequencies.entry(count).or_insert(0) += 1;
    }

    let mut best: Option<(u64, usize)> = None;
    for &count in counts {
        let frequency = frequencies[&count];
        if best.is_none_or(|(_, best_frequency)| frequency > best_frequency) {
            best = Some((count, frequency));
        }
    }

    best.map(|(count, _)| count).unwrap_or(0)
}

fn ratio(part: usize, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }

    round(part as f64 / whole as f64)
}

fn percentage(part: usize, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }

    round(part as f64 / whole as f64 * 100.0)
}

/// Rounds the exact binary value of `value` to [DECIMAL_PLACES], half to even.
///
/// A midpoint written in decimal (`0.005`) is usually not one in binary, so
/// this rounds the way a float rounding function would.
fn round(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(DECIMAL_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::RelayMap;
    use crate::model::{PhysicalLoop, Subunit};
    use proptest::prelude::*;

    fn subunit(rows: u32, cols: u32, counts: &[u64]) -> Subunit {
        let mut relays = RelayMap::new();
        for (i, &count) in counts.iter().enumerate() {
            let address = RelayAddress::resolve(i as u32 + 1, cols).unwrap();
            relays.insert(address, count);
        }

        Subunit {
            layer_id: 1,
            subunit_type: 1,
            rows,
            cols,
            num_components: 0,
            u2: 0,
            description: "Test".to_string(),
            relays,
        }
    }

    #[test]
    fn three_cell_layer() {
        let record = StatRecord::from_layer(&subunit(1, 3, &[10, 20, 30]));

        assert_eq!(record.mean, Decimal::new(20, 0));
        assert_eq!(record.std_dev, Decimal::new(10, 0));
        assert_eq!(record.peak, 30);
        assert_eq!(record.total, 60);
        assert_eq!(record.density, Decimal::ONE);
        assert_eq!(record.utilization, Decimal::ONE_HUNDRED);
        assert_eq!(record.recorded, 3);
    }

    #[test]
    fn empty_layer_is_all_zero() {
        let record = StatRecord::from_layer(&subunit(4, 4, &[]));

        assert_eq!(record.peak, 0);
        assert_eq!(record.total, 0);
        assert!(record.top.is_empty());
        assert_eq!(record.mean, Decimal::ZERO);
        assert_eq!(record.utilization, Decimal::ZERO);
        assert_eq!(record.std_dev, Decimal::ZERO);
        assert_eq!(record.most_common_count, 0);
        assert_eq!(record.density, Decimal::ZERO);
    }

    #[test]
    fn single_entry_has_zero_std_dev() {
        let record = StatRecord::from_layer(&subunit(2, 2, &[17]));

        assert_eq!(record.std_dev, Decimal::ZERO);
        assert_eq!(record.mean, Decimal::new(17, 0));
        assert_eq!(record.utilization, Decimal::new(25, 0));
        assert_eq!(record.density, Decimal::new(25, 2));
    }

    #[test]
    fn zero_counts_are_sampled_but_not_utilized() {
        let record = StatRecord::from_layer(&subunit(2, 2, &[0, 0, 8]));

        assert_eq!(record.mean, Decimal::new(267, 2));
        assert_eq!(record.utilization, Decimal::new(25, 0));
        assert_eq!(record.most_common_count, 0);
    }

    #[test]
    fn density_rounds_binary_midpoint_up() {
        // 1/200 is slightly above 0.005 as a float.
        let record = StatRecord::from_layer(&subunit(10, 20, &[5]));

        assert_eq!(record.density, Decimal::new(1, 2));
        assert_eq!(record.utilization, Decimal::new(5, 1));
    }

    #[test]
    fn mean_rounds_binary_midpoint_down() {
        // 107/40 is slightly below 2.675 as a float.
        let mut counts = vec![3; 27];
        counts.extend([2; 13]);
        let record = StatRecord::from_layer(&subunit(5, 8, &counts));

        assert_eq!(record.total, 107);
        assert_eq!(record.mean, Decimal::new(267, 2));
    }

    #[test]
    fn exact_midpoint_rounds_to_even() {
        let record = StatRecord::from_layer(&subunit(2, 4, &[9]));

        assert_eq!(record.density, Decimal::new(12, 2));
        assert_eq!(record.utilization, Decimal::new(125, 1));
    }

    #[test]
    fn top_relays_keep_file_order_on_ties() {
        let record = StatRecord::from_layer(&subunit(2, 4, &[5, 9, 5, 1, 9, 5, 3]));

        assert_eq!(
            record.top,
            vec![
                (RelayAddress::new(0, 1), 9),
                (RelayAddress::new(1, 0), 9),
                (RelayAddress::new(0, 0), 5),
                (RelayAddress::new(0, 2), 5),
                (RelayAddress::new(1, 1), 5),
            ]
        );
        assert_eq!(record.top_labels()[0], "Bit (1, 2)");
    }

    #[test]
    fn most_common_prefers_first_seen() {
        let record = StatRecord::from_layer(&subunit(1, 6, &[4, 7, 7, 4, 2, 1]));
        assert_eq!(record.most_common_count, 4);
    }

    #[test]
    fn physical_loop_uses_rows_as_area() {
        let mut relays = RelayMap::new();
        relays.insert(RelayAddress::new(0, 0), 3);
        relays.insert(RelayAddress::new(2, 0), 6);
        let physical_loop = PhysicalLoop {
            loop_id: 0,
            rows: 8,
            relays,
        };

        let record = StatRecord::from_layer(&physical_loop);
        assert_eq!(record.layer, LayerRef::Physical(0));
        assert_eq!(record.utilization, Decimal::new(25, 0));
        assert_eq!(record.density, Decimal::new(25, 2));
        assert_eq!(record.top_labels(), vec!["Bit 3", "Bit 1"]);
    }

    #[test]
    fn zero_area_layer() {
        let record = StatRecord::from_layer(&subunit(0, 1, &[5]));
        assert_eq!(record.utilization, Decimal::ZERO);
        assert_eq!(record.density, Decimal::ZERO);
    }

    #[test]
    fn card_overview() {
        let card = CardModel::from_bytes(
            b"A;1;Loops;1;4\nS;0;1;2;2;5;0;Bank\nR;L;S1BIT1;10\nR;L;S1BIT2;40\nR;P;L0BIT1;25\n",
        )
        .unwrap();

        let statistics = CardStatistics::from_model(&card);
        assert_eq!(statistics.layers.len(), 2);
        assert_eq!(statistics.layers[0].layer, LayerRef::Logical(1));
        assert_eq!(statistics.layers[1].layer, LayerRef::Physical(0));
        assert_eq!(statistics.peak, 40);
        assert_eq!(statistics.total, 75);

        // No hidden mutation between calls.
        assert_eq!(statistics, CardStatistics::from_model(&card));
    }

    proptest! {
        #[test]
        fn prop_mean_is_within_rounding_of_average(counts in proptest::collection::vec(0u64..1_000_000, 1..40)) {
            let record = StatRecord::from_layer(&subunit(8, 5, &counts));
            let sum: u64 = counts.iter().sum();
            let exact = Decimal::from(sum) / Decimal::from(counts.len());
            prop_assert!((record.mean - exact).abs() <= Decimal::new(5, 3));
            prop_assert!(record.mean.scale() <= 2);
        }

        #[test]
        fn prop_top_is_sorted_and_bounded(counts in proptest::collection::vec(0u64..100, 0..40)) {
            let record = StatRecord::from_layer(&subunit(8, 5, &counts));
            prop_assert!(record.top.len() <= TOP_RELAYS);
            prop_assert!(record.top.windows(2).all(|w| w[0].1 >= w[1].1));
            prop_assert_eq!(record.peak, counts.iter().copied().max().unwrap_or(0));
        }
    }
}
