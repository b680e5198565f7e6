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

//! Inputs for the money-moving operations.

use crate::base::AccountKind;
use crate::transaction::CheckImages;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from: AccountKind,
    pub amount: Decimal,
    pub destination: TransferDestination,
    pub note: Option<String>,
}

impl TransferRequest {
    pub fn internal(from: AccountKind, to: AccountKind, amount: Decimal) -> Self {
        Self {
            from,
            amount,
            destination: TransferDestination::Internal(to),
            note: None,
        }
    }

    pub fn external(from: AccountKind, recipient: ExternalRecipient, amount: Decimal) -> Self {
        Self {
            from,
            amount,
            destination: TransferDestination::External(recipient),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferDestination {
    /// Another account of the same customer; both legs are booked.
    Internal(AccountKind),
    /// Someone else's account; only the debit leg is booked.
    External(ExternalRecipient),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRecipient {
    pub name: String,
    pub bank: String,
    pub account_number: String,
    /// Add to saved recipients unless the account number is already saved.
    pub save: bool,
}

/// A mobile check deposit into checking.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub images: CheckImages,
}

/// A bill paid from checking.
#[derive(Debug, Clone, PartialEq)]
pub struct BillPayment {
    pub biller_name: String,
    pub amount: Decimal,
    pub category: String,
    pub reference_number: String,
}
