// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for the relay card database library.
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

/// Errors that can occur while reading a card database file.
///
/// Malformed lines and relay records that reference undeclared layers are
/// not errors; they are skipped while the model is built.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record reader failed for a reason other than I/O.
    #[error("record read error: {0}")]
    Read(csv::Error),
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        if !error.is_io_error() {
            return Error::Read(error);
        }

        match error.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            kind => Error::Io(std::io::Error::other(format!("{:?}", kind))),
        }
    }
}

/// Result type for card database operations.
pub type Result<T> = std::result::Result<T, Error>;
