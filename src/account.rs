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

//! Account balances.
//!
//! Every document carries exactly three accounts, addressed by [`AccountKind`].
//! Balances only move through [`Account::debit`] and [`Account::credit`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use bank_ledger_rs::{Account, AccountKind};
//!
//! let mut account = Account::new("ACC-CHK-1", "Checking", "****0001", dec!(100.00), "EUR");
//! account.debit(AccountKind::Checking, dec!(40.00)).unwrap();
//! assert_eq!(account.balance, dec!(60.00));
//! ```

use crate::base::AccountKind;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Masked account number, e.g. `****4567`.
    pub number: String,
    pub balance: Decimal,
    pub currency: String,
    /// Annual percentage yield (savings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apy: Option<Decimal>,
    /// Year-to-date return (investment only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ytd_return: Option<Decimal>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        number: impl Into<String>,
        balance: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: number.into(),
            balance,
            currency: currency.into(),
            apy: None,
            ytd_return: None,
        }
    }

    pub fn with_apy(mut self, apy: Decimal) -> Self {
        self.apy = Some(apy);
        self
    }

    pub fn with_ytd_return(mut self, ytd_return: Decimal) -> Self {
        self.ytd_return = Some(ytd_return);
        self
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of {} went negative: {}",
            self.id,
            self.balance
        );
    }

    /// Decreases the balance.
    ///
    /// `kind` only labels the error.
    pub fn debit(&mut self, kind: AccountKind, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                account: kind,
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }

    /// Increases the balance.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        self.balance += amount;
        self.assert_invariants();
        Ok(())
    }
}

/// The fixed account set of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accounts {
    pub checking: Account,
    pub savings: Account,
    pub investment: Account,
}

impl Accounts {
    pub fn get(&self, kind: AccountKind) -> &Account {
        match kind {
            AccountKind::Checking => &self.checking,
            AccountKind::Savings => &self.savings,
            AccountKind::Investment => &self.investment,
        }
    }

    pub fn get_mut(&mut self, kind: AccountKind) -> &mut Account {
        match kind {
            AccountKind::Checking => &mut self.checking,
            AccountKind::Savings => &mut self.savings,
            AccountKind::Investment => &mut self.investment,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccountKind, &Account)> {
        AccountKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Sum of all three balances.
    pub fn total(&self) -> Decimal {
        self.iter().map(|(_, account)| account.balance).sum()
    }

    /// Debits `from` and credits `to` by the same amount.
    ///
    /// The balance check happens before either side moves, so a rejected
    /// move leaves both accounts untouched.
    pub fn move_funds(
        &mut self,
        from: AccountKind,
        to: AccountKind,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount);
        }
        self.get_mut(from).debit(from, amount)?;
        self.get_mut(to).credit(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn accounts() -> Accounts {
        Accounts {
            checking: Account::new("C", "Checking", "****0001", dec!(100.00), "EUR"),
            savings: Account::new("S", "Savings", "****0002", dec!(50.00), "EUR")
                .with_apy(dec!(4.85)),
            investment: Account::new("I", "Investment", "****0003", dec!(10.00), "EUR")
                .with_ytd_return(dec!(1.00)),
        }
    }

    #[test]
    fn debit_reduces_balance() {
        let mut account = Account::new("C", "Checking", "****0001", dec!(100.00), "EUR");
        account.debit(AccountKind::Checking, dec!(30.00)).unwrap();
        assert_eq!(account.balance, dec!(70.00));
    }

    #[test]
    fn debit_whole_balance_is_allowed() {
        let mut account = Account::new("C", "Checking", "****0001", dec!(100.00), "EUR");
        account.debit(AccountKind::Checking, dec!(100.00)).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn debit_insufficient_returns_error() {
        let mut account = Account::new("C", "Checking", "****0001", dec!(50.00), "EUR");
        let result = account.debit(AccountKind::Checking, dec!(50.01));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { account: AccountKind::Checking, .. })
        ));
        assert_eq!(account.balance, dec!(50.00));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut account = Account::new("C", "Checking", "****0001", dec!(50.00), "EUR");
        assert!(matches!(
            account.debit(AccountKind::Checking, Decimal::ZERO),
            Err(LedgerError::InvalidAmount)
        ));
        assert!(matches!(account.credit(dec!(-1)), Err(LedgerError::InvalidAmount)));
    }

    #[test]
    fn move_funds_conserves_total() {
        let mut accounts = accounts();
        let before = accounts.total();
        accounts
            .move_funds(AccountKind::Checking, AccountKind::Savings, dec!(25.50))
            .unwrap();
        assert_eq!(accounts.checking.balance, dec!(74.50));
        assert_eq!(accounts.savings.balance, dec!(75.50));
        assert_eq!(accounts.total(), before);
    }

    #[test]
    fn failed_move_touches_nothing() {
        let mut accounts = accounts();
        let before = accounts.clone();
        let result = accounts.move_funds(AccountKind::Investment, AccountKind::Savings, dec!(11));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(accounts, before);
    }

    #[test]
    fn move_to_same_account_is_rejected() {
        let mut accounts = accounts();
        let result = accounts.move_funds(AccountKind::Savings, AccountKind::Savings, dec!(1));
        assert!(matches!(result, Err(LedgerError::SameAccount)));
    }

    #[test]
    fn type_specific_fields_are_omitted_when_absent() {
        let json = serde_json::to_value(accounts()).unwrap();
        assert_eq!(json["savings"]["apy"], "4.85");
        assert!(json["checking"].get("apy").is_none());
        assert_eq!(json["investment"]["ytdReturn"], "1.00");
        assert_eq!(json["checking"]["balance"], "100.00");
    }
}
