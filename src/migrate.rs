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

//! Schema detection and upgrade.
//!
//! Three document shapes exist in the wild:
//!
//! | Schema | Marker | Notes |
//! |--------|--------|-------|
//! | [`Schema::Current`] | `schemaVersion: 2` | this crate's [`Document`] |
//! | [`Schema::Nested`] | `accounts: {checking, savings, investment}` | typed transactions, float amounts |
//! | [`Schema::Flat`] | `account`, `savings`, `investments` at the root | credit/debit transactions, float amounts |
//!
//! Legacy amounts are JSON floats and may carry binary drift
//! (`127416.37000000001`); they are rounded to cents on the way in.
//! Legacy payee ids are dropped and payees are re-keyed in list order.
//! Fields a legacy document lacks are filled from the [`SeedConfig`].

use crate::account::{Account, Accounts};
use crate::base::{AccountKind, TicketId, TransactionId};
use crate::document::{Document, SCHEMA_VERSION};
use crate::error::{LedgerError, LedgerResult};
use crate::payee::{Biller, Recipient, RecipientKind};
use crate::seed::SeedConfig;
use crate::ticket::{SupportTicket, TicketPriority, TicketStatus};
use crate::transaction::{
    CheckImages, PendingDeposit, Transaction, TransactionKind, TransactionStatus,
    TransactionSubtype,
};
use crate::user::UserProfile;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Current,
    Nested,
    Flat,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Current => "current",
            Self::Nested => "nested-accounts",
            Self::Flat => "flat-accounts",
        };
        f.write_str(s)
    }
}

/// A decoded document and the schema it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub schema: Schema,
}

impl Decoded {
    pub fn was_migrated(&self) -> bool {
        self.schema != Schema::Current
    }
}

pub fn detect(value: &Value) -> LedgerResult<Schema> {
    if let Some(version) = value.get("schemaVersion") {
        let version = version
            .as_u64()
            .ok_or_else(|| LedgerError::CorruptDocument("schemaVersion is not a number".into()))?;
        return match u32::try_from(version) {
            Ok(SCHEMA_VERSION) => Ok(Schema::Current),
            Ok(other) => Err(LedgerError::UnsupportedSchema(other)),
            Err(_) => Err(LedgerError::UnsupportedSchema(u32::MAX)),
        };
    }
    if value.get("accounts").is_some_and(Value::is_object) {
        return Ok(Schema::Nested);
    }
    if value.get("account").is_some_and(Value::is_object) {
        return Ok(Schema::Flat);
    }
    Err(LedgerError::CorruptDocument(
        "unrecognized document shape".into(),
    ))
}

/// Decodes a stored blob of any known schema into a current [`Document`].
pub fn decode(blob: &str, seed: &SeedConfig) -> LedgerResult<Decoded> {
    let value: Value = serde_json::from_str(blob)?;
    let schema = detect(&value)?;
    let document = match schema {
        Schema::Current => serde_json::from_value(value)?,
        Schema::Nested => from_nested(parse(value)?, seed)?,
        Schema::Flat => from_flat(parse(value)?, seed)?,
    };
    Ok(Decoded { document, schema })
}

fn parse<T: DeserializeOwned>(value: Value) -> LedgerResult<T> {
    serde_json::from_value(value).map_err(|e| LedgerError::CorruptDocument(e.to_string()))
}

// === Shared legacy pieces ===

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyUser {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    avatar: Option<String>,
    account_created: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBiller {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    account_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecipient {
    name: String,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTicket {
    id: String,
    date: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    priority: Option<String>,
}

fn money(n: &Number) -> LedgerResult<Decimal> {
    let text = n.to_string();
    let mut value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| LedgerError::CorruptDocument(format!("invalid amount {text}")))?;
    value.rescale(2);
    Ok(value)
}

fn opt_money(n: Option<&Number>) -> LedgerResult<Option<Decimal>> {
    n.map(money).transpose()
}

fn timestamp(s: &str) -> LedgerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| LedgerError::CorruptDocument(format!("invalid timestamp '{s}'")))
}

fn status(s: Option<&str>) -> TransactionStatus {
    match s {
        Some("pending") => TransactionStatus::Pending,
        _ => TransactionStatus::Completed,
    }
}

/// Parses a lowercase serde tag such as `"transfer"` into one of our enums.
fn tag<T: DeserializeOwned>(s: &str) -> Option<T> {
    serde_json::from_value(Value::String(s.to_ascii_lowercase())).ok()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn user(legacy: Option<LegacyUser>, seed: &SeedConfig) -> LedgerResult<UserProfile> {
    let legacy = legacy.unwrap_or_default();
    let fallback = &seed.user;
    Ok(UserProfile {
        id: legacy.id.unwrap_or_else(|| fallback.id.clone()),
        first_name: legacy.first_name.unwrap_or_else(|| fallback.first_name.clone()),
        last_name: legacy.last_name.unwrap_or_else(|| fallback.last_name.clone()),
        email: legacy.email.unwrap_or_else(|| fallback.email.clone()),
        phone: legacy.phone.unwrap_or_else(|| fallback.phone.clone()),
        avatar: legacy.avatar,
        account_created: match legacy.account_created {
            Some(s) => timestamp(&s)?,
            None => fallback.account_created,
        },
    })
}

fn payees(
    doc: &mut Document,
    billers: Vec<LegacyBiller>,
    recipients: Vec<LegacyRecipient>,
) {
    for biller in billers {
        let id = doc.allocate_payee_id();
        doc.billers.insert(
            id,
            Biller {
                id,
                name: biller.name,
                category: biller.category.unwrap_or_default(),
                account_number: biller.account_number.unwrap_or_default(),
            },
        );
    }
    for recipient in recipients {
        let id = doc.allocate_payee_id();
        let kind = match recipient.kind.as_deref() {
            Some("internal") => RecipientKind::Internal,
            _ => RecipientKind::External,
        };
        doc.recipients.insert(
            id,
            Recipient {
                id,
                name: recipient.name,
                bank: recipient.bank.unwrap_or_default(),
                account_number: recipient.account_number.unwrap_or_default(),
                kind,
            },
        );
    }
}

fn tickets(legacy: Vec<LegacyTicket>) -> LedgerResult<Vec<SupportTicket>> {
    legacy
        .into_iter()
        .map(|t| {
            Ok(SupportTicket {
                id: TicketId(t.id),
                date: timestamp(&t.date)?,
                subject: t.subject,
                category: t.category,
                message: t.message,
                priority: t
                    .priority
                    .and_then(|p| p.parse::<TicketPriority>().ok())
                    .unwrap_or_default(),
                status: TicketStatus::Open,
            })
        })
        .collect()
}

// === Nested-accounts schema ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedDocument {
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    user: Option<LegacyUser>,
    accounts: NestedAccounts,
    #[serde(default)]
    transactions: Vec<NestedTransaction>,
    #[serde(default)]
    pending_deposits: Vec<NestedTransaction>,
    #[serde(default)]
    support_tickets: Vec<LegacyTicket>,
    #[serde(default)]
    billers: Vec<LegacyBiller>,
    #[serde(default)]
    recipients: Vec<LegacyRecipient>,
}

#[derive(Debug, Deserialize)]
struct NestedAccounts {
    checking: NestedAccount,
    savings: NestedAccount,
    investment: NestedAccount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedAccount {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    number: Option<String>,
    balance: Number,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    apy: Option<Number>,
    #[serde(default)]
    ytd_return: Option<Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedTransaction {
    id: String,
    date: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    description: Option<String>,
    amount: Number,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    from_account: Option<String>,
    #[serde(default)]
    to_account: Option<String>,
    #[serde(default)]
    recipient_name: Option<String>,
    #[serde(default)]
    recipient_bank: Option<String>,
    #[serde(default)]
    recipient_account: Option<String>,
    #[serde(default)]
    sender_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    front_image: Option<String>,
    #[serde(default)]
    back_image: Option<String>,
    #[serde(default)]
    estimated_clearance: Option<String>,
}

fn nested_account(
    legacy: NestedAccount,
    fallback: &Account,
) -> LedgerResult<Account> {
    Ok(Account {
        id: legacy.id.unwrap_or_else(|| fallback.id.clone()),
        name: legacy.name.unwrap_or_else(|| fallback.name.clone()),
        number: legacy.number.unwrap_or_else(|| fallback.number.clone()),
        balance: money(&legacy.balance)?,
        currency: legacy.currency.unwrap_or_else(|| fallback.currency.clone()),
        apy: opt_money(legacy.apy.as_ref())?,
        ytd_return: opt_money(legacy.ytd_return.as_ref())?,
    })
}

fn nested_transaction(legacy: NestedTransaction, currency: &str) -> LedgerResult<Transaction> {
    let amount = money(&legacy.amount)?;
    let kind = legacy
        .kind
        .as_deref()
        .and_then(tag::<TransactionKind>)
        .unwrap_or(if amount < Decimal::ZERO {
            TransactionKind::Payment
        } else {
            TransactionKind::Deposit
        });

    let mut tx = Transaction::new(
        TransactionId(legacy.id),
        timestamp(&legacy.date)?,
        kind,
        legacy.description.unwrap_or_default(),
        amount,
        legacy.currency.unwrap_or_else(|| currency.to_string()),
    );
    tx.subtype = legacy.subtype.as_deref().and_then(tag);
    tx.from_account = legacy.from_account.as_deref().and_then(|a| a.parse().ok());
    tx.to_account = legacy.to_account.as_deref().and_then(|a| a.parse().ok());
    tx.recipient_name = non_empty(legacy.recipient_name);
    tx.recipient_bank = non_empty(legacy.recipient_bank);
    tx.recipient_account = non_empty(legacy.recipient_account);
    tx.sender_name = non_empty(legacy.sender_name);
    tx.status = status(legacy.status.as_deref());
    tx.reference = non_empty(legacy.reference);
    tx.category = non_empty(legacy.category);
    tx.note = non_empty(legacy.note);
    tx.estimated_clearance = legacy
        .estimated_clearance
        .as_deref()
        .map(timestamp)
        .transpose()?;
    Ok(tx)
}

fn nested_deposit(legacy: NestedTransaction, currency: &str) -> LedgerResult<PendingDeposit> {
    let images = CheckImages {
        front_image: legacy.front_image.clone(),
        back_image: legacy.back_image.clone(),
    };
    let tx = nested_transaction(legacy, currency)?;
    Ok(PendingDeposit {
        estimated_clearance: tx
            .estimated_clearance
            .unwrap_or(tx.date + Duration::days(2)),
        id: tx.id,
        date: tx.date,
        amount: tx.amount,
        currency: tx.currency,
        to_account: tx.to_account.unwrap_or(AccountKind::Checking),
        images,
        status: tx.status,
        reference: tx.reference,
    })
}

fn from_nested(legacy: NestedDocument, seed: &SeedConfig) -> LedgerResult<Document> {
    let accounts = Accounts {
        checking: nested_account(legacy.accounts.checking, &seed.accounts.checking)?,
        savings: nested_account(legacy.accounts.savings, &seed.accounts.savings)?,
        investment: nested_account(legacy.accounts.investment, &seed.accounts.investment)?,
    };
    let currency = accounts.checking.currency.clone();

    let mut doc = Document::new(user(legacy.user, seed)?, accounts);
    doc.is_authenticated = legacy.is_authenticated;
    doc.transactions = legacy
        .transactions
        .into_iter()
        .map(|t| nested_transaction(t, &currency))
        .collect::<LedgerResult<_>>()?;
    doc.pending_deposits = legacy
        .pending_deposits
        .into_iter()
        .map(|t| nested_deposit(t, &currency))
        .collect::<LedgerResult<_>>()?;
    doc.support_tickets = tickets(legacy.support_tickets)?;
    payees(&mut doc, legacy.billers, legacy.recipients);
    Ok(doc)
}

// === Flat-accounts schema ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatDocument {
    account: FlatChecking,
    #[serde(default)]
    savings: Option<FlatSavings>,
    #[serde(default)]
    investments: Option<FlatInvestments>,
    #[serde(default)]
    user: Option<LegacyUser>,
    #[serde(default)]
    transactions: Vec<FlatTransaction>,
    #[serde(default)]
    pending_deposits: Vec<FlatDeposit>,
    #[serde(default)]
    support_tickets: Vec<LegacyTicket>,
    #[serde(default)]
    billers: Vec<LegacyBiller>,
    #[serde(default)]
    recipients: Vec<LegacyRecipient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatChecking {
    balance: Number,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default)]
    account_type: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatSavings {
    balance: Number,
    #[serde(default)]
    apy: Option<Number>,
    #[serde(default)]
    account_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatInvestments {
    balance: Number,
    #[serde(default)]
    ytd_return: Option<Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatTransaction {
    id: String,
    date: String,
    #[serde(default)]
    description: Option<String>,
    amount: Number,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    recipient: Option<String>,
    #[serde(default)]
    recipient_bank: Option<String>,
    #[serde(default)]
    recipient_account: Option<String>,
    #[serde(default)]
    transfer_type: Option<String>,
    #[serde(default, rename = "description_note")]
    note: Option<String>,
    #[serde(default)]
    biller_category: Option<String>,
    #[serde(default)]
    reference_number: Option<String>,
    #[serde(default)]
    account: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatDeposit {
    id: String,
    date: String,
    amount: Number,
    #[serde(default)]
    front_image: Option<String>,
    #[serde(default)]
    back_image: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    estimated_clearance: Option<String>,
}

/// Maps a credit/debit record onto our kind/subtype using its category.
fn flat_transaction(legacy: FlatTransaction, currency: &str) -> LedgerResult<Transaction> {
    let amount = money(&legacy.amount)?;
    let account = legacy
        .account
        .as_deref()
        .and_then(|a| a.parse::<AccountKind>().ok())
        .unwrap_or(AccountKind::Checking);
    let credit = amount >= Decimal::ZERO;

    let (kind, subtype) = match legacy.category.as_deref() {
        Some("Transfer") => (
            TransactionKind::Transfer,
            legacy.transfer_type.as_deref().and_then(tag),
        ),
        Some("Investment") => (TransactionKind::Transfer, Some(TransactionSubtype::Internal)),
        Some("Bills") => (TransactionKind::Payment, Some(TransactionSubtype::Bill)),
        Some("Deposit") => (TransactionKind::Deposit, Some(TransactionSubtype::Check)),
        Some("Income") => (TransactionKind::Deposit, Some(TransactionSubtype::Direct)),
        Some("Interest") => (TransactionKind::Deposit, Some(TransactionSubtype::Interest)),
        Some("Cash") => (TransactionKind::Withdrawal, Some(TransactionSubtype::Cash)),
        _ if credit => (TransactionKind::Deposit, None),
        _ => (TransactionKind::Payment, Some(TransactionSubtype::Purchase)),
    };

    let mut tx = Transaction::new(
        TransactionId(legacy.id),
        timestamp(&legacy.date)?,
        kind,
        legacy.description.unwrap_or_default(),
        amount,
        currency,
    );
    tx.subtype = subtype;
    tx.status = status(legacy.status.as_deref());
    tx.note = non_empty(legacy.note);
    tx.recipient_bank = non_empty(legacy.recipient_bank);

    if credit {
        tx.to_account = Some(account);
        if subtype != Some(TransactionSubtype::Check) {
            tx.sender_name = non_empty(legacy.recipient);
        }
    } else {
        tx.from_account = Some(account);
        tx.recipient_name = non_empty(legacy.recipient);
        if kind == TransactionKind::Transfer && subtype == Some(TransactionSubtype::Internal) {
            tx.to_account = Some(AccountKind::Investment);
        }
    }

    if subtype == Some(TransactionSubtype::Bill) {
        tx.recipient_account = non_empty(legacy.reference_number);
        tx.category = non_empty(legacy.biller_category);
    } else {
        tx.recipient_account = non_empty(legacy.recipient_account);
        tx.category = non_empty(legacy.category);
    }
    Ok(tx)
}

fn flat_deposit(legacy: FlatDeposit, currency: &str) -> LedgerResult<PendingDeposit> {
    let date = timestamp(&legacy.date)?;
    Ok(PendingDeposit {
        id: TransactionId(legacy.id),
        date,
        amount: money(&legacy.amount)?,
        currency: currency.to_string(),
        to_account: AccountKind::Checking,
        images: CheckImages {
            front_image: legacy.front_image,
            back_image: legacy.back_image,
        },
        status: status(legacy.status.as_deref()),
        reference: None,
        estimated_clearance: match legacy.estimated_clearance {
            Some(s) => timestamp(&s)?,
            None => date + Duration::days(2),
        },
    })
}

fn from_flat(legacy: FlatDocument, seed: &SeedConfig) -> LedgerResult<Document> {
    let template = &seed.accounts;
    let currency = legacy
        .account
        .currency
        .clone()
        .unwrap_or_else(|| template.checking.currency.clone());

    let checking = Account {
        id: template.checking.id.clone(),
        name: legacy
            .account
            .account_type
            .unwrap_or_else(|| template.checking.name.clone()),
        number: legacy
            .account
            .account_number
            .unwrap_or_else(|| template.checking.number.clone()),
        balance: money(&legacy.account.balance)?,
        currency: currency.clone(),
        apy: None,
        ytd_return: None,
    };

    let savings = match legacy.savings {
        Some(s) => Account {
            number: s
                .account_number
                .unwrap_or_else(|| template.savings.number.clone()),
            balance: money(&s.balance)?,
            apy: opt_money(s.apy.as_ref())?,
            currency: currency.clone(),
            ..template.savings.clone()
        },
        None => template.savings.clone(),
    };

    let investment = match legacy.investments {
        Some(i) => Account {
            balance: money(&i.balance)?,
            ytd_return: opt_money(i.ytd_return.as_ref())?,
            currency: currency.clone(),
            ..template.investment.clone()
        },
        None => template.investment.clone(),
    };

    let mut doc = Document::new(
        user(legacy.user, seed)?,
        Accounts {
            checking,
            savings,
            investment,
        },
    );
    doc.transactions = legacy
        .transactions
        .into_iter()
        .map(|t| flat_transaction(t, &currency))
        .collect::<LedgerResult<_>>()?;
    doc.pending_deposits = legacy
        .pending_deposits
        .into_iter()
        .map(|d| flat_deposit(d, &currency))
        .collect::<LedgerResult<_>>()?;
    doc.support_tickets = tickets(legacy.support_tickets)?;
    payees(&mut doc, legacy.billers, legacy.recipients);
    Ok(doc)
}
