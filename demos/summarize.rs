// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  summarize.rs - Statistics and heatmap demo for relay card database files.
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

use std::collections::BTreeMap;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relaycard::heatmap::{HeatmapThresholds, Severity, classify_layer};
use relaycard::model::Layer;
use relaycard::statistics::CardStatistics;

/// Layers with more cells than this get no heatmap.
const MAX_HEATMAP_CELLS: u64 = 1 << 20;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,

    /// Highest count still classified as OK.
    #[arg(long, default_value_t = HeatmapThresholds::default().ok_max)]
    ok_max: u64,

    /// Highest count still classified as a warning.
    #[arg(long, default_value_t = HeatmapThresholds::default().warning_max)]
    warning_max: u64,

    /// Print the statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Log every parsed relay.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let card = match relaycard::parse(&args.file) {
        Ok(card) => card,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    let statistics = CardStatistics::from_model(&card);

    if args.json {
        match serde_json::to_string_pretty(&statistics) {
            Ok(json) => println!("{}", json),
            Err(error) => eprintln!("Error serializing statistics: {:?}", error),
        }
        return;
    }

    if let Some(header) = &card.header {
        let generation = card
            .generation
            .map(|g| g.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "Card Info: Version {}, {} (Generation {})",
            header.version, header.card_info, generation
        );
    }
    println!("Peak count: {}, total count: {}", statistics.peak, statistics.total);

    let thresholds = HeatmapThresholds {
        ok_max: args.ok_max,
        warning_max: args.warning_max,
    };

    for (layer, record) in card.layers().zip(&statistics.layers) {
        println!();
        println!("{}", record.layer);
        println!("  Maximum switch operations: {}", record.peak);
        println!("  Highest counted relays:    {}", record.top_labels().join(", "));
        println!("  Mean operations:           {}", record.mean);
        println!("  Utilization (%):           {}", record.utilization);
        println!("  Standard deviation:        {}", record.std_dev);
        println!("  Most common count:         {}", record.most_common_count);
        println!("  Density:                   {}", record.density);

        if layer.area() > MAX_HEATMAP_CELLS {
            println!("  Heatmap ({} cells):       skipped, too large", layer.area());
            continue;
        }

        let mut severities: BTreeMap<Severity, usize> = BTreeMap::new();
        for (_, severity) in classify_layer(layer, &thresholds) {
            *severities.entry(severity).or_insert(0) += 1;
        }
        let heatmap: Vec<String> = severities
            .iter()
            .map(|(severity, cells)| format!("{:?}: {}", severity, cells))
            .collect();
        println!("  Heatmap ({} cells):       {}", layer.area(), heatmap.join(", "));
    }
}
