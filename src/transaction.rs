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

//! Transaction log records.
//!
//! The log is kept newest first. A check deposit shows up twice: once as a
//! [`Pending`] transaction in the log and once as a [`PendingDeposit`]
//! sharing the same id.
//!
//! [`Pending`]: TransactionStatus::Pending

use crate::base::{AccountKind, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Transfer,
    Payment,
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSubtype {
    Internal,
    External,
    Bill,
    Purchase,
    Direct,
    Check,
    Interest,
    Cash,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
}

/// One entry of the transaction log.
///
/// `amount` is signed: debits are negative, credits positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<TransactionSubtype>,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_account: Option<AccountKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<AccountKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_clearance: Option<DateTime<Utc>>,
}

impl Transaction {
    /// A completed record with every optional field empty.
    pub fn new(
        id: TransactionId,
        date: DateTime<Utc>,
        kind: TransactionKind,
        description: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date,
            kind,
            subtype: None,
            description: description.into(),
            amount,
            currency: currency.into(),
            from_account: None,
            to_account: None,
            recipient_name: None,
            recipient_bank: None,
            recipient_account: None,
            sender_name: None,
            status: TransactionStatus::Completed,
            reference: None,
            category: None,
            note: None,
            estimated_clearance: None,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Opaque references to the scanned check images (paths, URLs, data URIs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
}

/// A submitted check deposit awaiting clearance.
///
/// Nothing clears a deposit yet; the record stays `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDeposit {
    pub id: TransactionId,
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
    pub to_account: AccountKind,
    #[serde(flatten)]
    pub images: CheckImages,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub estimated_clearance: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn serializes_type_tag_and_skips_empty_fields() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut tx = Transaction::new(
            TransactionId::from("TXN-1"),
            date,
            TransactionKind::Payment,
            "Amazon.de",
            dec!(-89.99),
            "EUR",
        );
        tx.subtype = Some(TransactionSubtype::Purchase);
        tx.from_account = Some(AccountKind::Checking);

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "payment");
        assert_eq!(json["subtype"], "purchase");
        assert_eq!(json["amount"], "-89.99");
        assert_eq!(json["fromAccount"], "checking");
        assert_eq!(json["status"], "completed");
        assert!(json.get("toAccount").is_none());
        assert!(json.get("note").is_none());
        assert!(tx.is_debit());
        assert!(!tx.is_pending());
    }

    #[test]
    fn pending_deposit_flattens_images() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let deposit = PendingDeposit {
            id: TransactionId::from("TXN-2"),
            date,
            amount: dec!(250.00),
            currency: "EUR".into(),
            to_account: AccountKind::Checking,
            images: CheckImages {
                front_image: Some("front.png".into()),
                back_image: Some("back.png".into()),
            },
            status: TransactionStatus::Pending,
            reference: None,
            estimated_clearance: date,
        };
        let json = serde_json::to_value(&deposit).unwrap();
        assert_eq!(json["frontImage"], "front.png");
        assert_eq!(json["backImage"], "back.png");

        let back: PendingDeposit = serde_json::from_value(json).unwrap();
        assert_eq!(back, deposit);
    }
}
