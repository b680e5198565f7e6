// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types for ledger operations and storage backends.

use crate::base::AccountKind;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Debit would exceed the account balance
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: AccountKind,
        requested: Decimal,
        available: Decimal,
    },

    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Internal transfer names the same account on both sides
    #[error("source and destination account are the same")]
    SameAccount,

    /// Estimated clearance date falls outside the supported calendar
    #[error("clearance date out of range")]
    ClearanceOutOfRange,

    /// Email/password pair does not match the demo credentials
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Another writer replaced the document after it was read
    #[error("document was modified concurrently (read revision {revision})")]
    Conflict { revision: u64 },

    /// Stored document carries a schema version this build does not know
    #[error("unsupported schema version {0}")]
    UnsupportedSchema(u32),

    /// Stored document is structurally invalid
    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    /// Document could not be encoded or decoded
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Storage backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Storage backend errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Temp file could not replace the target
    #[error("failed to persist {key}: {source}")]
    Persist {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
