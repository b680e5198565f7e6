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

//! Demo seed data.
//!
//! A [`SeedConfig`] is a plain value handed to the ledger. Seeding builds a
//! brand new [`Document`](crate::Document) from it every time, so resets and
//! tests never observe each other's state.

use crate::account::{Account, Accounts};
use crate::base::{AccountKind, TransactionId};
use crate::payee::RecipientKind;
use crate::transaction::{Transaction, TransactionKind, TransactionSubtype};
use crate::user::UserProfile;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A sample transaction, dated relative to the seeding time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedTransaction {
    pub days_ago: i64,
    /// Id, date and reference are replaced when the seed is materialized.
    pub template: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBiller {
    pub name: String,
    pub category: String,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecipient {
    pub name: String,
    pub bank: String,
    pub account_number: String,
    pub kind: RecipientKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub user: UserProfile,
    pub accounts: Accounts,
    pub transactions: Vec<SeedTransaction>,
    pub billers: Vec<SeedBiller>,
    pub recipients: Vec<SeedRecipient>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self::demo()
    }
}

impl SeedConfig {
    /// An empty-history seed with the given accounts and user.
    pub fn new(user: UserProfile, accounts: Accounts) -> Self {
        Self {
            user,
            accounts,
            transactions: Vec::new(),
            billers: Vec::new(),
            recipients: Vec::new(),
        }
    }

    /// The demo customer, three accounts, five sample transactions,
    /// five billers and three recipients.
    pub fn demo() -> Self {
        let currency = "EUR";
        let user = UserProfile {
            id: "USR-001".to_string(),
            first_name: "Alexander".to_string(),
            last_name: "Mitchell".to_string(),
            email: "alexander.mitchell@email.com".to_string(),
            phone: "+49 170 123 4567".to_string(),
            avatar: None,
            account_created: Utc
                .with_ymd_and_hms(2023, 8, 15, 10, 30, 0)
                .single()
                .unwrap_or_default(),
        };

        let accounts = Accounts {
            checking: Account::new(
                "ACC-CHK-4567",
                "Premium Checking",
                "****4567",
                dec!(127543.82),
                currency,
            ),
            savings: Account::new(
                "ACC-SAV-7890",
                "High-Yield Savings",
                "****7890",
                dec!(45230.15),
                currency,
            )
            .with_apy(dec!(4.85)),
            investment: Account::new(
                "ACC-INV-1122",
                "Investment Portfolio",
                "****1122",
                dec!(69466.00),
                currency,
            )
            .with_ytd_return(dec!(7654.00)),
        };

        let mut internal = sample(
            TransactionKind::Transfer,
            TransactionSubtype::Internal,
            "Transfer to Savings",
            dec!(-1000.00),
        );
        internal.from_account = Some(AccountKind::Checking);
        internal.to_account = Some(AccountKind::Savings);
        internal.recipient_name = Some("Savings Account".to_string());
        internal.recipient_account = Some("****7890".to_string());

        let mut bill = sample(
            TransactionKind::Payment,
            TransactionSubtype::Bill,
            "Electricity Bill",
            dec!(-127.45),
        );
        bill.from_account = Some(AccountKind::Checking);
        bill.recipient_name = Some("E.ON Energy".to_string());
        bill.recipient_account = Some("EON-12345678".to_string());
        bill.category = Some("Electricity".to_string());

        let mut salary = sample(
            TransactionKind::Deposit,
            TransactionSubtype::Direct,
            "Salary Deposit",
            dec!(5240.00),
        );
        salary.to_account = Some(AccountKind::Checking);
        salary.recipient_name = Some("Alexander Mitchell".to_string());
        salary.sender_name = Some("Vanstra Capital Ltd.".to_string());

        let mut external = sample(
            TransactionKind::Transfer,
            TransactionSubtype::External,
            "Transfer to Maria Schmidt",
            dec!(-500.00),
        );
        external.from_account = Some(AccountKind::Checking);
        external.recipient_name = Some("Maria Schmidt".to_string());
        external.recipient_bank = Some("Deutsche Bank".to_string());
        external.recipient_account = Some("DE89 3704 0044 0532 0130 00".to_string());

        let mut purchase = sample(
            TransactionKind::Payment,
            TransactionSubtype::Purchase,
            "Amazon.de",
            dec!(-89.99),
        );
        purchase.from_account = Some(AccountKind::Checking);
        purchase.recipient_name = Some("Amazon.de".to_string());

        let transactions = [internal, bill, salary, external, purchase]
            .into_iter()
            .enumerate()
            .map(|(days_ago, template)| SeedTransaction {
                days_ago: days_ago as i64,
                template,
            })
            .collect();

        let billers = [
            ("E.ON Energy", "Electricity", "EON-12345678"),
            ("Vodafone", "Internet", "VOD-87654321"),
            ("Sky Deutschland", "Cable", "SKY-11223344"),
            ("Berliner Wasserbetriebe", "Water", "BWB-55667788"),
            ("Telekom", "Phone", "TK-99887766"),
        ]
        .into_iter()
        .map(|(name, category, account_number)| SeedBiller {
            name: name.to_string(),
            category: category.to_string(),
            account_number: account_number.to_string(),
        })
        .collect();

        let recipients = [
            (
                "Maria Schmidt",
                "Deutsche Bank",
                "DE89 3704 0044 0532 0130 00",
                RecipientKind::External,
            ),
            (
                "Hans Weber",
                "Commerzbank",
                "DE15 1203 0000 0012 3456 7890",
                RecipientKind::External,
            ),
            (
                "Investment Account",
                "Vanstra Capital",
                "****1122",
                RecipientKind::Internal,
            ),
        ]
        .into_iter()
        .map(|(name, bank, account_number, kind)| SeedRecipient {
            name: name.to_string(),
            bank: bank.to_string(),
            account_number: account_number.to_string(),
            kind,
        })
        .collect();

        Self {
            user,
            accounts,
            transactions,
            billers,
            recipients,
        }
    }

    /// Currency of the checking account, used for seeded records.
    pub fn currency(&self) -> &str {
        &self.accounts.get(AccountKind::Checking).currency
    }
}

fn sample(
    kind: TransactionKind,
    subtype: TransactionSubtype,
    description: &str,
    amount: Decimal,
) -> Transaction {
    let mut tx = Transaction::new(
        TransactionId(String::new()),
        DateTime::<Utc>::UNIX_EPOCH,
        kind,
        description,
        amount,
        "EUR",
    );
    tx.subtype = Some(subtype);
    tx
}
