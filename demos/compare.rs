// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  compare.rs - Comparison demo for relay card database files.
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

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relaycard::diff::{CellDiffKind, DEFAULT_NEAR_TOLERANCE, compare_grid};
use relaycard::model::Layer;

/// Layers with more cells than this are not compared cell by cell.
const MAX_GRID_CELLS: u64 = 1 << 20;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The first file to read.
    first: String,

    /// The second file to read.
    second: String,

    /// Largest difference still reported as near.
    #[arg(long, default_value_t = DEFAULT_NEAR_TOLERANCE)]
    tolerance: u64,

    /// List every cell that differs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut cards = Vec::new();
    for file in [&args.first, &args.second] {
        match relaycard::parse(file) {
            Ok(card) => cards.push(card),
            Err(error) => {
                eprintln!("Error opening file {:?}: {:?}", file, error);
                return;
            }
        }
    }
    let (first, second) = (&cards[0], &cards[1]);

    println!("{}", relaycard::compare(first, second));

    if !args.verbose {
        return;
    }

    // Cell-level differences, matching layers by id.
    for layer in first.layers() {
        let Some(other) = second.layer(layer.layer_ref()) else {
            println!("{}: missing from {}", layer.layer_ref(), &args.second);
            continue;
        };
        if layer.area() > MAX_GRID_CELLS {
            println!("{}: {} cells, skipping cell comparison", layer.layer_ref(), layer.area());
            continue;
        }

        for cell in compare_grid(layer, other, args.tolerance) {
            if cell.kind == CellDiffKind::Equal {
                continue;
            }
            println!(
                "{} {}: {} vs {} ({:?})",
                layer.layer_ref(),
                layer.layer_ref().relay_label(&cell.address),
                cell.left,
                cell.right,
                cell.kind
            );
        }
    }
}
