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

//! The ledger store.
//!
//! A [`Ledger`] owns no state of its own beyond configuration: every
//! operation loads the stored [`Document`], works on that private copy and
//! writes it back whole.
//!
//! # Load
//!
//! 1. The primary key holds a current document: use it.
//! 2. The primary key holds a legacy document: migrate it and write it back.
//! 3. The primary key is empty: migrate the first legacy key that has a blob.
//! 4. Otherwise seed a fresh document from the [`SeedConfig`].
//!
//! # Concurrency
//!
//! Operations on one `Ledger` are serialized by an internal mutex. Separate
//! ledgers over the same [`Storage`] are kept apart by compare-and-swap: a
//! write succeeds only if the stored blob is still the one the operation
//! read, otherwise the operation fails with [`LedgerError::Conflict`] and
//! nothing is written. Conflicts are not retried.

use crate::account::Accounts;
use crate::base::TransactionId;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::document::Document;
use crate::error::{LedgerError, LedgerResult};
use crate::migrate;
use crate::payee::{Biller, NewBiller, Recipient};
use crate::request::{BillPayment, DepositRequest, TransferRequest};
use crate::seed::SeedConfig;
use crate::storage::Storage;
use crate::ticket::{SupportTicket, TicketRequest};
use crate::transaction::{PendingDeposit, Transaction};
use crate::user::{CurrentUser, ProfileUpdate, UserProfile, UserRegistry};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Demo banking state store over a [`Storage`] backend.
///
/// ```
/// use bank_ledger_rs::{AccountKind, Ledger, MemoryStorage, TransferRequest};
/// use rust_decimal_macros::dec;
/// use std::sync::Arc;
///
/// let ledger = Ledger::new(Arc::new(MemoryStorage::new()));
/// let tx = ledger
///     .transfer(TransferRequest::internal(
///         AccountKind::Checking,
///         AccountKind::Savings,
///         dec!(1000.00),
///     ))
///     .unwrap();
///
/// assert_eq!(tx.amount, dec!(-1000.00));
/// let accounts = ledger.accounts().unwrap();
/// assert_eq!(accounts.checking.balance, dec!(126543.82));
/// assert_eq!(accounts.savings.balance, dec!(46230.15));
/// ```
pub struct Ledger {
    storage: Arc<dyn Storage>,
    config: LedgerConfig,
    seed: SeedConfig,
    clock: Arc<dyn Clock>,
    /// Serializes read-modify-write cycles on this instance.
    gate: Mutex<()>,
}

impl Ledger {
    /// A ledger with default configuration, the demo seed and wall-clock time.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            config: LedgerConfig::default(),
            seed: SeedConfig::default(),
            clock: Arc::new(SystemClock),
            gate: Mutex::new(()),
        }
    }

    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        if let Some(backend) = config.configured_backend() {
            info!(url = %backend.url, "remote backend configured; state stays in local storage");
        }
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: SeedConfig) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current time according to the ledger's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // === Load and commit ===

    /// Returns the stored blob under the primary key and its decoded form,
    /// migrating or seeding first if needed.
    fn load(&self) -> LedgerResult<(String, Document)> {
        let key = &self.config.storage_key;

        if let Some(blob) = self.storage.read(key)? {
            let decoded = migrate::decode(&blob, &self.seed)?;
            if !decoded.was_migrated() {
                return Ok((blob, decoded.document));
            }
            info!(key = %key, schema = %decoded.schema, "upgrading stored document");
            return self.install(Some(&blob), decoded.document);
        }

        for legacy in &self.config.legacy_keys {
            if let Some(blob) = self.storage.read(legacy)? {
                let decoded = migrate::decode(&blob, &self.seed)?;
                info!(from = %legacy, to = %key, schema = %decoded.schema, "migrating legacy document");
                return self.install(None, decoded.document);
            }
        }

        info!(key = %key, "seeding new document");
        self.install(None, Document::seeded(&self.seed, self.clock.now()))
    }

    /// Writes `doc` over `current`. If another writer installed a document
    /// first, that one wins and is returned instead.
    fn install(&self, current: Option<&str>, doc: Document) -> LedgerResult<(String, Document)> {
        let key = &self.config.storage_key;
        let blob = serde_json::to_string(&doc)?;
        if self.storage.compare_and_swap(key, current, &blob)? {
            return Ok((blob, doc));
        }

        debug!(key = %key, "document installed concurrently; using stored copy");
        let stored = self
            .storage
            .read(key)?
            .ok_or(LedgerError::Conflict { revision: doc.revision })?;
        let decoded = migrate::decode(&stored, &self.seed)?;
        if decoded.was_migrated() {
            return Err(LedgerError::Conflict { revision: doc.revision });
        }
        Ok((stored, decoded.document))
    }

    /// Runs `f` on a private copy of the document and persists the result.
    ///
    /// Nothing is written if `f` fails or the stored blob changed meanwhile.
    fn commit<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Document, DateTime<Utc>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let _gate = self.gate.lock();
        let (blob, mut doc) = self.load()?;
        let read_revision = doc.revision;

        let value = f(&mut doc, self.clock.now()).inspect_err(|e| {
            debug!(op, error = %e, "operation rejected");
        })?;

        doc.revision = read_revision + 1;
        let next = serde_json::to_string(&doc)?;
        if !self
            .storage
            .compare_and_swap(&self.config.storage_key, Some(&blob), &next)?
        {
            warn!(op, revision = read_revision, "document changed since it was read");
            return Err(LedgerError::Conflict {
                revision: read_revision,
            });
        }

        debug!(op, revision = doc.revision, "committed");
        Ok(value)
    }

    fn view<T>(&self, f: impl FnOnce(Document) -> T) -> LedgerResult<T> {
        let _gate = self.gate.lock();
        let (_, doc) = self.load()?;
        Ok(f(doc))
    }

    /// The whole stored document, seeding or migrating it on first access.
    pub fn document(&self) -> LedgerResult<Document> {
        self.view(|doc| doc)
    }

    /// Replaces the stored document with a freshly seeded one.
    ///
    /// Works even when the stored blob is unreadable. The revision keeps
    /// counting up from a readable predecessor.
    pub fn reset(&self) -> LedgerResult<Document> {
        let _gate = self.gate.lock();
        let key = &self.config.storage_key;

        let previous = self
            .storage
            .read(key)?
            .and_then(|blob| migrate::decode(&blob, &self.seed).ok())
            .map(|decoded| decoded.document.revision);

        let mut doc = Document::seeded(&self.seed, self.clock.now());
        doc.revision = previous.map_or(0, |revision| revision + 1);
        self.storage.write(key, &serde_json::to_string(&doc)?)?;

        info!(key = %key, revision = doc.revision, "document reset to seed");
        Ok(doc)
    }

    // === Session ===

    /// Checks the demo credentials and marks the session authenticated.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCredentials`] - email or password mismatch.
    pub fn login(&self, email: &str, password: &str) -> LedgerResult<UserProfile> {
        if !self.config.credentials.matches(email, password) {
            warn!(email, "login rejected");
            return Err(LedgerError::InvalidCredentials);
        }
        let user = self.commit("login", |doc, _| {
            doc.is_authenticated = true;
            Ok(doc.user.clone())
        })?;
        info!(user = %user.id, "logged in");
        Ok(user)
    }

    pub fn logout(&self) -> LedgerResult<()> {
        self.commit("logout", |doc, _| {
            doc.is_authenticated = false;
            Ok(())
        })
    }

    pub fn is_authenticated(&self) -> LedgerResult<bool> {
        self.view(|doc| doc.is_authenticated)
    }

    // === Profile ===

    pub fn user(&self) -> LedgerResult<UserProfile> {
        self.view(|doc| doc.user)
    }

    pub fn update_profile(&self, update: ProfileUpdate) -> LedgerResult<UserProfile> {
        self.commit("update_profile", |doc, _| {
            doc.user.apply(update);
            Ok(doc.user.clone())
        })
    }

    pub fn update_avatar(&self, avatar: impl Into<String>) -> LedgerResult<UserProfile> {
        let avatar = avatar.into();
        self.commit("update_avatar", |doc, _| {
            doc.user.avatar = Some(avatar);
            Ok(doc.user.clone())
        })
    }

    /// The profile enriched with status from the user registry, if any.
    ///
    /// An unreadable registry is ignored.
    pub fn current_user(&self) -> LedgerResult<CurrentUser> {
        let profile = self.user()?;
        let key = &self.config.user_registry_key;
        let registry = match self.storage.read(key)? {
            Some(blob) => match serde_json::from_str::<UserRegistry>(&blob) {
                Ok(registry) => Some(registry),
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring unreadable user registry");
                    None
                }
            },
            None => None,
        };
        Ok(CurrentUser::resolve(profile, registry.as_ref()))
    }

    // === Money movement ===

    /// Moves money between own accounts or out to an external recipient.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::SameAccount`] - internal transfer to the source account.
    /// - [`LedgerError::InsufficientFunds`] - amount exceeds the source balance.
    /// - [`LedgerError::Conflict`] - another writer got there first.
    pub fn transfer(&self, request: TransferRequest) -> LedgerResult<Transaction> {
        let currency = self.config.currency.as_str();
        self.commit("transfer", |doc, now| doc.transfer(request, now, currency))
    }

    /// Records a mobile check deposit as pending. Balances do not change.
    pub fn submit_deposit(&self, request: DepositRequest) -> LedgerResult<PendingDeposit> {
        let currency = self.config.currency.as_str();
        let clearance = Duration::try_days(i64::from(self.config.clearance_days))
            .ok_or(LedgerError::ClearanceOutOfRange)?;
        self.commit("submit_deposit", |doc, now| {
            doc.submit_deposit(request, now, currency, clearance)
        })
    }

    /// Pays a bill out of checking.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::InsufficientFunds`] - amount exceeds the checking balance.
    /// - [`LedgerError::Conflict`] - another writer got there first.
    pub fn pay_bill(&self, payment: BillPayment) -> LedgerResult<Transaction> {
        let currency = self.config.currency.as_str();
        self.commit("pay_bill", |doc, now| doc.pay_bill(payment, now, currency))
    }

    pub fn add_biller(&self, biller: NewBiller) -> LedgerResult<Biller> {
        self.commit("add_biller", |doc, _| Ok(doc.add_biller(biller)))
    }

    pub fn submit_ticket(&self, request: TicketRequest) -> LedgerResult<SupportTicket> {
        self.commit("submit_ticket", |doc, now| Ok(doc.submit_ticket(request, now)))
    }

    // === Reads ===

    /// Newest first, at most `limit` (default from config).
    pub fn transactions(&self, limit: Option<usize>) -> LedgerResult<Vec<Transaction>> {
        let limit = limit.unwrap_or(self.config.transaction_limit);
        self.view(|mut doc| {
            doc.transactions.truncate(limit);
            doc.transactions
        })
    }

    pub fn transaction(&self, id: &TransactionId) -> LedgerResult<Option<Transaction>> {
        self.view(|doc| doc.transaction(id).cloned())
    }

    pub fn pending_deposits(&self) -> LedgerResult<Vec<PendingDeposit>> {
        self.view(|doc| doc.pending_deposits)
    }

    pub fn billers(&self) -> LedgerResult<Vec<Biller>> {
        self.view(|doc| doc.billers.into_values().collect())
    }

    pub fn recipients(&self) -> LedgerResult<Vec<Recipient>> {
        self.view(|doc| doc.recipients.into_values().collect())
    }

    pub fn tickets(&self) -> LedgerResult<Vec<SupportTicket>> {
        self.view(|doc| doc.support_tickets)
    }

    pub fn accounts(&self) -> LedgerResult<Accounts> {
        self.view(|doc| doc.accounts)
    }

    pub fn total_balance(&self) -> LedgerResult<Decimal> {
        self.view(|doc| doc.total_balance())
    }
}
