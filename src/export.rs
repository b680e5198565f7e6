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

//! CSV export of the transaction log.

use crate::transaction::{Transaction, TransactionKind, TransactionStatus, TransactionSubtype};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One flattened log entry.
#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    id: &'a str,
    date: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    subtype: Option<TransactionSubtype>,
    description: &'a str,
    amount: Decimal,
    currency: &'a str,
    from_account: Option<&'static str>,
    to_account: Option<&'static str>,
    counterparty: Option<&'a str>,
    status: TransactionStatus,
    reference: Option<&'a str>,
    category: Option<&'a str>,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: tx.id.as_str(),
            date: tx.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            kind: tx.kind,
            subtype: tx.subtype,
            description: &tx.description,
            amount: tx.amount,
            currency: &tx.currency,
            from_account: tx.from_account.map(|k| k.as_str()),
            to_account: tx.to_account.map(|k| k.as_str()),
            counterparty: tx
                .recipient_name
                .as_deref()
                .or(tx.sender_name.as_deref()),
            status: tx.status,
            reference: tx.reference.as_deref(),
            category: tx.category.as_deref(),
        }
    }
}

/// Writes `transactions` as CSV, in the order given.
///
/// # CSV Format
///
/// ```csv
/// id,date,type,subtype,description,amount,currency,from_account,to_account,counterparty,status,reference,category
/// TXN-...,2025-06-01T12:00:00Z,payment,bill,E.ON Energy,-127.45,EUR,checking,,E.ON Energy,completed,REF-8K2M1Q7Z,Utilities
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_transactions_csv<'a, W, I>(transactions: I, writer: W) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(TransactionRow::from(tx))?;
    }
    wtr.flush()?;
    Ok(())
}
