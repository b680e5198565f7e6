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

//! # Bank Ledger
//!
//! This library is the state store behind a demo banking front-end: account
//! balances, the transaction log, pending check deposits, saved payees and
//! support tickets, all kept in one document in a key-value blob store.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Loads, seeds and migrates the document; runs every operation
//! - [`Document`]: The persisted state and its pure mutations
//! - [`Storage`]: Blob store with compare-and-swap ([`MemoryStorage`], [`FileStorage`])
//! - [`LedgerError`]: Error types for rejected operations and storage failures
//!
//! ## Example
//!
//! ```
//! use bank_ledger_rs::{BillPayment, Ledger, MemoryStorage};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let ledger = Ledger::new(Arc::new(MemoryStorage::new()));
//!
//! let tx = ledger
//!     .pay_bill(BillPayment {
//!         biller_name: "E.ON Energy".into(),
//!         amount: dec!(127.45),
//!         category: "Utilities".into(),
//!         reference_number: "EON-2291-4471".into(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(tx.amount, dec!(-127.45));
//! assert_eq!(ledger.transactions(None).unwrap()[0].id, tx.id);
//! assert_eq!(ledger.accounts().unwrap().checking.balance, dec!(127416.37));
//! ```
//!
//! ## Thread Safety
//!
//! A [`Ledger`] is `Send + Sync` and serializes its own operations. Ledgers
//! sharing one storage detect each other's writes and fail with
//! [`LedgerError::Conflict`] instead of overwriting them.

pub mod account;
mod base;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod format;
mod ledger;
pub mod migrate;
pub mod payee;
mod request;
pub mod seed;
pub mod storage;
pub mod ticket;
pub mod transaction;
pub mod user;

pub use account::{Account, Accounts};
pub use base::{AccountKind, PayeeId, TicketId, TransactionId, UnknownAccount, generate_reference};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BackendConfig, ConfigError, Credentials, LedgerConfig};
pub use document::{Document, SCHEMA_VERSION};
pub use error::{LedgerError, LedgerResult, StorageError, StorageResult};
pub use ledger::Ledger;
pub use payee::{Biller, NewBiller, Recipient, RecipientKind};
pub use request::{
    BillPayment, DepositRequest, ExternalRecipient, TransferDestination, TransferRequest,
};
pub use seed::SeedConfig;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use ticket::{SupportTicket, TicketPriority, TicketRequest, TicketStatus};
pub use transaction::{
    CheckImages, PendingDeposit, Transaction, TransactionKind, TransactionStatus,
    TransactionSubtype,
};
pub use user::{CurrentUser, ProfileUpdate, UserProfile};
