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

//! The persisted ledger document.
//!
//! A [`Document`] is the whole state of one installation. The mutations here
//! are pure: they touch only `self` and never perform I/O. The
//! [`Ledger`](crate::Ledger) runs them against a private copy and persists
//! the result in a single write, so an error part-way through never leaks
//! into storage.
//!
//! # Invariants
//!
//! - `transactions`, `pending_deposits` and `support_tickets` are newest first.
//! - Every balance change is matched by exactly one new transaction.
//! - Every pending deposit has a `pending` transaction with the same id.
//! - `next_payee_id` is greater than every key in `billers` and `recipients`.

use crate::account::Accounts;
use crate::base::{AccountKind, PayeeId, TicketId, TransactionId, generate_reference};
use crate::error::{LedgerError, LedgerResult};
use crate::payee::{Biller, NewBiller, Recipient, RecipientKind};
use crate::request::{BillPayment, DepositRequest, TransferDestination, TransferRequest};
use crate::seed::SeedConfig;
use crate::ticket::{SupportTicket, TicketRequest, TicketStatus};
use crate::transaction::{
    PendingDeposit, Transaction, TransactionKind, TransactionStatus, TransactionSubtype,
};
use crate::user::UserProfile;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub schema_version: u32,
    /// Bumped on every successful write.
    pub revision: u64,
    pub is_authenticated: bool,
    pub user: UserProfile,
    pub accounts: Accounts,
    pub transactions: Vec<Transaction>,
    pub pending_deposits: Vec<PendingDeposit>,
    pub billers: BTreeMap<PayeeId, Biller>,
    pub recipients: BTreeMap<PayeeId, Recipient>,
    pub next_payee_id: u64,
    pub support_tickets: Vec<SupportTicket>,
}

impl Document {
    /// An empty document for `user` and `accounts`.
    pub fn new(user: UserProfile, accounts: Accounts) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            revision: 0,
            is_authenticated: false,
            user,
            accounts,
            transactions: Vec::new(),
            pending_deposits: Vec::new(),
            billers: BTreeMap::new(),
            recipients: BTreeMap::new(),
            next_payee_id: 1,
            support_tickets: Vec::new(),
        }
    }

    /// Materializes `seed` as of `now`.
    ///
    /// Sample transactions are dated `days_ago` days before `now` and get
    /// fresh ids and reference codes.
    pub fn seeded(seed: &SeedConfig, now: DateTime<Utc>) -> Self {
        let mut doc = Self::new(seed.user.clone(), seed.accounts.clone());

        doc.transactions = seed
            .transactions
            .iter()
            .map(|sample| {
                let mut tx = sample.template.clone();
                tx.id = TransactionId::generate();
                tx.date = now - Duration::days(sample.days_ago);
                tx.reference = Some(generate_reference());
                tx
            })
            .collect();

        for biller in &seed.billers {
            let id = doc.allocate_payee_id();
            doc.billers.insert(
                id,
                Biller {
                    id,
                    name: biller.name.clone(),
                    category: biller.category.clone(),
                    account_number: biller.account_number.clone(),
                },
            );
        }

        for recipient in &seed.recipients {
            let id = doc.allocate_payee_id();
            doc.recipients.insert(
                id,
                Recipient {
                    id,
                    name: recipient.name.clone(),
                    bank: recipient.bank.clone(),
                    account_number: recipient.account_number.clone(),
                    kind: recipient.kind,
                },
            );
        }

        doc
    }

    pub fn allocate_payee_id(&mut self) -> PayeeId {
        let id = PayeeId(self.next_payee_id);
        self.next_payee_id += 1;
        id
    }

    /// Prepends `tx` to the log.
    fn record(&mut self, tx: Transaction) {
        self.transactions.insert(0, tx);
    }

    pub fn total_balance(&self) -> Decimal {
        self.accounts.total()
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    /// The newest `limit` transactions.
    pub fn recent_transactions(&self, limit: usize) -> &[Transaction] {
        &self.transactions[..limit.min(self.transactions.len())]
    }

    pub fn recipient_by_account(&self, account_number: &str) -> Option<&Recipient> {
        self.recipients
            .values()
            .find(|r| r.account_number == account_number)
    }

    /// Moves money out of `request.from`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::SameAccount`] - internal transfer to the source account.
    /// - [`LedgerError::InsufficientFunds`] - amount exceeds the source balance.
    pub fn transfer(
        &mut self,
        request: TransferRequest,
        now: DateTime<Utc>,
        currency: &str,
    ) -> LedgerResult<Transaction> {
        let TransferRequest {
            from,
            amount,
            destination,
            note,
        } = request;

        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let mut tx = Transaction::new(
            TransactionId::generate(),
            now,
            TransactionKind::Transfer,
            String::new(),
            -amount,
            currency,
        );
        tx.from_account = Some(from);
        tx.reference = Some(generate_reference());
        tx.note = note.filter(|n| !n.trim().is_empty());

        match destination {
            TransferDestination::Internal(to) => {
                self.accounts.move_funds(from, to, amount)?;

                let target = self.accounts.get(to);
                tx.subtype = Some(TransactionSubtype::Internal);
                tx.description = format!("Transfer to {}", target.name);
                tx.to_account = Some(to);
                tx.recipient_name = Some(target.name.clone());
                tx.recipient_account = Some(target.number.clone());
            }
            TransferDestination::External(recipient) => {
                self.accounts.get_mut(from).debit(from, amount)?;

                tx.subtype = Some(TransactionSubtype::External);
                tx.description = format!("Transfer to {}", recipient.name);
                tx.recipient_name = Some(recipient.name.clone());
                tx.recipient_bank = Some(recipient.bank.clone());
                tx.recipient_account = Some(recipient.account_number.clone());

                if recipient.save && self.recipient_by_account(&recipient.account_number).is_none() {
                    let id = self.allocate_payee_id();
                    self.recipients.insert(
                        id,
                        Recipient {
                            id,
                            name: recipient.name,
                            bank: recipient.bank,
                            account_number: recipient.account_number,
                            kind: RecipientKind::External,
                        },
                    );
                }
            }
        }

        self.record(tx.clone());
        Ok(tx)
    }

    /// Records a check deposit as pending.
    ///
    /// No balance changes; the deposit is expected to clear after
    /// `clearance`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::ClearanceOutOfRange`] - `now + clearance` is not a valid date.
    pub fn submit_deposit(
        &mut self,
        request: DepositRequest,
        now: DateTime<Utc>,
        currency: &str,
        clearance: Duration,
    ) -> LedgerResult<PendingDeposit> {
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let id = TransactionId::generate();
        let reference = generate_reference();
        let estimated_clearance = now
            .checked_add_signed(clearance)
            .ok_or(LedgerError::ClearanceOutOfRange)?;

        let deposit = PendingDeposit {
            id: id.clone(),
            date: now,
            amount: request.amount,
            currency: currency.to_string(),
            to_account: AccountKind::Checking,
            images: request.images,
            status: TransactionStatus::Pending,
            reference: Some(reference.clone()),
            estimated_clearance,
        };

        let mut tx = Transaction::new(
            id,
            now,
            TransactionKind::Deposit,
            "Mobile Check Deposit",
            request.amount,
            currency,
        );
        tx.subtype = Some(TransactionSubtype::Check);
        tx.to_account = Some(AccountKind::Checking);
        tx.status = TransactionStatus::Pending;
        tx.reference = Some(reference);
        tx.estimated_clearance = Some(estimated_clearance);

        self.pending_deposits.insert(0, deposit.clone());
        self.record(tx);
        Ok(deposit)
    }

    /// Pays a bill out of checking.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::InsufficientFunds`] - amount exceeds the checking balance.
    pub fn pay_bill(
        &mut self,
        payment: BillPayment,
        now: DateTime<Utc>,
        currency: &str,
    ) -> LedgerResult<Transaction> {
        self.accounts
            .get_mut(AccountKind::Checking)
            .debit(AccountKind::Checking, payment.amount)?;

        let mut tx = Transaction::new(
            TransactionId::generate(),
            now,
            TransactionKind::Payment,
            payment.biller_name.clone(),
            -payment.amount,
            currency,
        );
        tx.subtype = Some(TransactionSubtype::Bill);
        tx.from_account = Some(AccountKind::Checking);
        tx.recipient_name = Some(payment.biller_name);
        tx.recipient_account = Some(payment.reference_number);
        tx.reference = Some(generate_reference());
        tx.category = Some(payment.category);

        self.record(tx.clone());
        Ok(tx)
    }

    pub fn add_biller(&mut self, biller: NewBiller) -> Biller {
        let id = self.allocate_payee_id();
        let biller = Biller {
            id,
            name: biller.name,
            category: biller.category,
            account_number: biller.account_number,
        };
        self.billers.insert(id, biller.clone());
        biller
    }

    pub fn submit_ticket(&mut self, request: TicketRequest, now: DateTime<Utc>) -> SupportTicket {
        let ticket = SupportTicket {
            id: TicketId::generate(),
            date: now,
            subject: request.subject,
            category: request.category,
            message: request.message,
            priority: request.priority.unwrap_or_default(),
            status: TicketStatus::Open,
        };
        self.support_tickets.insert(0, ticket.clone());
        ticket
    }
}
