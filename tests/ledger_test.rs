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

//! End-to-end tests for the ledger store over in-memory storage.

use bank_ledger_rs::{
    AccountKind, BillPayment, CheckImages, DepositRequest, ExternalRecipient, FixedClock, Ledger,
    LedgerConfig, LedgerError, MemoryStorage, NewBiller, ProfileUpdate, RecipientKind,
    SCHEMA_VERSION, Storage, TicketPriority, TicketRequest, TicketStatus, TransactionKind,
    TransactionStatus, TransactionSubtype, TransferRequest,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;

// === Helpers ===

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn setup() -> (Arc<MemoryStorage>, Arc<FixedClock>, Ledger) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(FixedClock::new(start()));
    let ledger = Ledger::new(storage.clone()).with_clock(clock.clone());
    (storage, clock, ledger)
}

fn eon(amount: rust_decimal::Decimal) -> BillPayment {
    BillPayment {
        biller_name: "E.ON Energy".into(),
        amount,
        category: "Electricity".into(),
        reference_number: "EON-12345678".into(),
    }
}

fn hans(save: bool) -> ExternalRecipient {
    ExternalRecipient {
        name: "Hans Weber".into(),
        bank: "Commerzbank".into(),
        account_number: "DE15 1203 0000 0012 3456 7890".into(),
        save,
    }
}

// === Loading ===

#[test]
fn first_load_seeds_demo_data() {
    let (_, _, ledger) = setup();
    let doc = ledger.document().unwrap();

    assert_eq!(doc.schema_version, SCHEMA_VERSION);
    assert!(!doc.is_authenticated);
    assert_eq!(doc.user.full_name(), "Alexander Mitchell");
    assert_eq!(doc.accounts.checking.balance, dec!(127543.82));
    assert_eq!(doc.accounts.savings.balance, dec!(45230.15));
    assert_eq!(doc.accounts.investment.balance, dec!(69466.00));
    assert_eq!(doc.total_balance(), dec!(242239.97));
    assert_eq!(doc.transactions.len(), 5);
    assert_eq!(doc.transactions[0].date, start());
}

#[test]
fn loading_twice_returns_identical_documents() {
    let (_, clock, ledger) = setup();
    let first = ledger.document().unwrap();
    clock.advance(Duration::days(3));
    let second = ledger.document().unwrap();
    assert_eq!(first, second);
}

#[test]
fn legacy_key_is_migrated_into_primary_key() {
    let (storage, _, ledger) = setup();
    let legacy = r#"{
        "isAuthenticated": true,
        "user": {"id": "USR-042", "firstName": "Erika", "lastName": "Muster",
                 "email": "erika@example.com", "phone": "+49 30 000000",
                 "accountCreated": "2022-01-01T00:00:00Z"},
        "accounts": {
            "checking": {"id": "C", "name": "Checking", "number": "****0001", "balance": 100.1, "currency": "EUR"},
            "savings": {"id": "S", "name": "Savings", "number": "****0002", "balance": 200.2, "currency": "EUR"},
            "investment": {"id": "I", "name": "Invest", "number": "****0003", "balance": 300.3, "currency": "EUR"}
        },
        "transactions": [],
        "pendingDeposits": [],
        "billers": [],
        "recipients": [],
        "supportTickets": []
    }"#;
    storage.write("vanstraBankState", legacy).unwrap();

    let doc = ledger.document().unwrap();
    assert_eq!(doc.user.first_name, "Erika");
    assert!(doc.is_authenticated);
    assert_eq!(doc.total_balance(), dec!(600.60));

    let stored: serde_json::Value =
        serde_json::from_str(&storage.read("bankState").unwrap().unwrap()).unwrap();
    assert_eq!(stored["schemaVersion"], 2);
    assert_eq!(ledger.document().unwrap(), doc);
}

#[test]
fn unsupported_schema_is_reported() {
    let (storage, _, ledger) = setup();
    storage.write("bankState", r#"{"schemaVersion": 9}"#).unwrap();
    assert!(matches!(
        ledger.document(),
        Err(LedgerError::UnsupportedSchema(9))
    ));
}

#[test]
fn reset_replaces_state_with_fresh_seed() {
    let (_, _, ledger) = setup();
    ledger.pay_bill(eon(dec!(100.00))).unwrap();
    ledger.login("alexander.mitchell@email.com", "password123").unwrap();

    let doc = ledger.reset().unwrap();
    assert_eq!(doc.revision, 3);
    assert!(!doc.is_authenticated);
    assert_eq!(doc.accounts.checking.balance, dec!(127543.82));
    assert_eq!(ledger.document().unwrap(), doc);
}

// === Session and profile ===

#[test]
fn login_and_logout_toggle_flag() {
    let (_, _, ledger) = setup();
    assert!(!ledger.is_authenticated().unwrap());

    let user = ledger
        .login("alexander.mitchell@email.com", "password123")
        .unwrap();
    assert_eq!(user.id, "USR-001");
    assert!(ledger.is_authenticated().unwrap());

    ledger.logout().unwrap();
    assert!(!ledger.is_authenticated().unwrap());
}

#[test]
fn wrong_password_is_rejected() {
    let (_, _, ledger) = setup();
    let err = ledger
        .login("alexander.mitchell@email.com", "hunter2")
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCredentials));
    assert!(!ledger.is_authenticated().unwrap());
}

#[test]
fn configured_credentials_are_used() {
    let (storage, _, _) = setup();
    let mut config = LedgerConfig::default();
    config.credentials.email = "demo@example.com".into();
    config.credentials.password = "s3cret".into();
    let ledger = Ledger::new(storage).with_config(config);

    assert!(ledger.login("alexander.mitchell@email.com", "password123").is_err());
    assert!(ledger.login("demo@example.com", "s3cret").is_ok());
}

#[test]
fn profile_updates_persist() {
    let (_, _, ledger) = setup();
    ledger
        .update_profile(ProfileUpdate {
            phone: Some("+49 151 000 0000".into()),
            ..Default::default()
        })
        .unwrap();
    ledger.update_avatar("avatars/alex.png").unwrap();

    let user = ledger.user().unwrap();
    assert_eq!(user.phone, "+49 151 000 0000");
    assert_eq!(user.first_name, "Alexander");
    assert_eq!(user.avatar.as_deref(), Some("avatars/alex.png"));
}

#[test]
fn current_user_reads_registry() {
    let (storage, _, ledger) = setup();
    assert_eq!(ledger.current_user().unwrap().account_status, "active");

    storage
        .write(
            "vanstraUsers",
            r#"{"a": {"id": "USR-9", "email": "alexander.mitchell@email.com", "accountStatus": "frozen", "isOnline": false}}"#,
        )
        .unwrap();
    let user = ledger.current_user().unwrap();
    assert_eq!(user.account_status, "frozen");
    assert_eq!(user.is_online, Some(false));
    assert_eq!(user.profile.id, "USR-9");

    storage.write("vanstraUsers", "[oops").unwrap();
    assert_eq!(ledger.current_user().unwrap().account_status, "active");
}

// === Transfers ===

#[test]
fn internal_transfer_checking_to_savings() {
    let (_, _, ledger) = setup();
    let tx = ledger
        .transfer(TransferRequest::internal(
            AccountKind::Checking,
            AccountKind::Savings,
            dec!(1000.00),
        ))
        .unwrap();

    let accounts = ledger.accounts().unwrap();
    assert_eq!(accounts.checking.balance, dec!(126543.82));
    assert_eq!(accounts.savings.balance, dec!(46230.15));
    assert_eq!(tx.amount, dec!(-1000.00));
    assert_eq!(tx.kind, TransactionKind::Transfer);
    assert_eq!(tx.subtype, Some(TransactionSubtype::Internal));
    assert_eq!(tx.from_account, Some(AccountKind::Checking));
    assert_eq!(tx.to_account, Some(AccountKind::Savings));
    assert_eq!(tx.description, "Transfer to High-Yield Savings");

    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["fromAccount"], "checking");
    assert_eq!(json["toAccount"], "savings");

    let log = ledger.transactions(None).unwrap();
    assert_eq!(log.len(), 6);
    assert_eq!(log[0].id, tx.id);
    assert_eq!(ledger.transaction(&tx.id).unwrap(), Some(tx));
}

#[test]
fn external_transfer_saves_new_recipient_once() {
    let (_, _, ledger) = setup();
    let before = ledger.recipients().unwrap().len();

    let tx = ledger
        .transfer(
            TransferRequest::external(AccountKind::Savings, hans(true), dec!(250.00))
                .with_note("Dinner"),
        )
        .unwrap();
    assert_eq!(tx.subtype, Some(TransactionSubtype::External));
    assert_eq!(tx.recipient_bank.as_deref(), Some("Commerzbank"));
    assert_eq!(tx.note.as_deref(), Some("Dinner"));
    assert_eq!(ledger.accounts().unwrap().savings.balance, dec!(44980.15));

    // Hans is already in the demo recipients.
    assert_eq!(ledger.recipients().unwrap().len(), before);

    let new = ExternalRecipient {
        account_number: "DE00 0000 0000 0000 0000 01".into(),
        ..hans(true)
    };
    ledger
        .transfer(TransferRequest::external(AccountKind::Checking, new.clone(), dec!(1)))
        .unwrap();
    ledger
        .transfer(TransferRequest::external(AccountKind::Checking, new, dec!(1)))
        .unwrap();

    let recipients = ledger.recipients().unwrap();
    assert_eq!(recipients.len(), before + 1);
    let saved = recipients.last().unwrap();
    assert_eq!(saved.kind, RecipientKind::External);
    assert_eq!(saved.id.0, 9);
}

#[test]
fn rejected_transfers_change_nothing() {
    let (_, _, ledger) = setup();
    let before = ledger.document().unwrap();

    let too_much = ledger.transfer(TransferRequest::internal(
        AccountKind::Investment,
        AccountKind::Checking,
        dec!(69466.01),
    ));
    assert!(matches!(
        too_much,
        Err(LedgerError::InsufficientFunds {
            account: AccountKind::Investment,
            ..
        })
    ));

    let same = ledger.transfer(TransferRequest::internal(
        AccountKind::Savings,
        AccountKind::Savings,
        dec!(1),
    ));
    assert!(matches!(same, Err(LedgerError::SameAccount)));

    let zero = ledger.transfer(TransferRequest::external(AccountKind::Checking, hans(true), dec!(0)));
    assert!(matches!(zero, Err(LedgerError::InvalidAmount)));

    assert_eq!(ledger.document().unwrap(), before);
}

#[test]
fn entire_balance_can_be_moved() {
    let (_, _, ledger) = setup();
    ledger
        .transfer(TransferRequest::internal(
            AccountKind::Investment,
            AccountKind::Savings,
            dec!(69466.00),
        ))
        .unwrap();
    let accounts = ledger.accounts().unwrap();
    assert_eq!(accounts.investment.balance, dec!(0));
    assert_eq!(accounts.total(), dec!(242239.97));
}

// === Deposits ===

#[test]
fn deposit_is_pending_and_leaves_balances() {
    let (_, _, ledger) = setup();
    let before = ledger.accounts().unwrap();

    let deposit = ledger
        .submit_deposit(DepositRequest {
            amount: dec!(420.00),
            images: CheckImages {
                front_image: Some("scan://front".into()),
                back_image: Some("scan://back".into()),
            },
        })
        .unwrap();

    assert_eq!(ledger.accounts().unwrap(), before);
    assert_eq!(deposit.estimated_clearance, start() + Duration::days(2));
    assert_eq!(deposit.images.front_image, Some("scan://front".to_string()));

    let pending = ledger.pending_deposits().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, deposit.id);

    let tx = &ledger.transactions(Some(1)).unwrap()[0];
    assert_eq!(tx.id, deposit.id);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.subtype, Some(TransactionSubtype::Check));
    assert_eq!(tx.to_account, Some(AccountKind::Checking));
    assert_eq!(tx.amount, dec!(420.00));
}

#[test]
fn clearance_days_follow_config() {
    let (storage, clock, _) = setup();
    let config = LedgerConfig {
        clearance_days: 5,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::new(storage).with_clock(clock).with_config(config);
    let deposit = ledger
        .submit_deposit(DepositRequest {
            amount: dec!(1),
            images: CheckImages::default(),
        })
        .unwrap();
    assert_eq!(deposit.estimated_clearance, start() + Duration::days(5));
}

#[test]
fn clearance_past_calendar_end_is_rejected() {
    let (storage, clock, _) = setup();
    let config = LedgerConfig {
        clearance_days: u32::MAX,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::new(storage).with_clock(clock).with_config(config);
    let before = ledger.document().unwrap();

    let result = ledger.submit_deposit(DepositRequest {
        amount: dec!(1),
        images: CheckImages::default(),
    });
    assert!(matches!(result, Err(LedgerError::ClearanceOutOfRange)));
    assert_eq!(ledger.document().unwrap(), before);
}

#[test]
fn negative_deposit_is_rejected() {
    let (_, _, ledger) = setup();
    let result = ledger.submit_deposit(DepositRequest {
        amount: dec!(-5),
        images: CheckImages::default(),
    });
    assert!(matches!(result, Err(LedgerError::InvalidAmount)));
    assert!(ledger.pending_deposits().unwrap().is_empty());
}

// === Bills and payees ===

#[test]
fn pay_bill_debits_checking() {
    let (_, _, ledger) = setup();
    let tx = ledger.pay_bill(eon(dec!(127.45))).unwrap();

    assert_eq!(ledger.accounts().unwrap().checking.balance, dec!(127416.37));
    assert_eq!(tx.amount, dec!(-127.45));
    assert_eq!(tx.recipient_name.as_deref(), Some("E.ON Energy"));
    assert_eq!(tx.recipient_account.as_deref(), Some("EON-12345678"));
    assert_eq!(tx.category.as_deref(), Some("Electricity"));
    assert_eq!(tx.subtype, Some(TransactionSubtype::Bill));
}

#[test]
fn pay_bill_over_balance_fails() {
    let (_, _, ledger) = setup();
    let err = ledger.pay_bill(eon(dec!(127543.83))).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientFunds {
            account: AccountKind::Checking,
            ..
        }
    ));
    assert_eq!(ledger.accounts().unwrap().checking.balance, dec!(127543.82));
    assert_eq!(ledger.transactions(None).unwrap().len(), 5);
}

#[test]
fn added_billers_get_increasing_ids() {
    let (_, _, ledger) = setup();
    let first = ledger
        .add_biller(NewBiller {
            name: "Stadtwerke".into(),
            category: "Gas".into(),
            account_number: "SW-1".into(),
        })
        .unwrap();
    let second = ledger
        .add_biller(NewBiller {
            name: "GEZ".into(),
            category: "Broadcast".into(),
            account_number: "GEZ-2".into(),
        })
        .unwrap();
    assert!(second.id > first.id);

    let billers = ledger.billers().unwrap();
    assert_eq!(billers.len(), 7);
    assert_eq!(billers.last().unwrap().name, "GEZ");
}

// === Tickets ===

#[test]
fn tickets_are_prepended_with_defaults() {
    let (_, clock, ledger) = setup();
    let first = ledger
        .submit_ticket(TicketRequest {
            subject: "Card".into(),
            category: "cards".into(),
            message: "Lost my card".into(),
            priority: None,
        })
        .unwrap();
    clock.advance(Duration::minutes(5));
    let second = ledger
        .submit_ticket(TicketRequest {
            subject: "Login".into(),
            category: "access".into(),
            message: "Locked out".into(),
            priority: Some(TicketPriority::Urgent),
        })
        .unwrap();

    assert_eq!(first.priority, TicketPriority::Medium);
    assert_eq!(first.status, TicketStatus::Open);
    assert!(first.id.0.starts_with("TKT-"));
    assert_ne!(first.id, second.id);

    let tickets = ledger.tickets().unwrap();
    assert_eq!(tickets[0].id, second.id);
    assert_eq!(tickets[1].id, first.id);
    assert_eq!(tickets[0].date, start() + Duration::minutes(5));
}

// === Reads ===

#[test]
fn transaction_limit_defaults_to_config() {
    let (storage, clock, _) = setup();
    let config = LedgerConfig {
        transaction_limit: 3,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::new(storage).with_clock(clock).with_config(config);
    assert_eq!(ledger.transactions(None).unwrap().len(), 3);
    assert_eq!(ledger.transactions(Some(100)).unwrap().len(), 5);
}

#[test]
fn shared_storage_sees_other_ledgers_writes() {
    let (storage, clock, first) = setup();
    let second = Ledger::new(storage).with_clock(clock);

    first.pay_bill(eon(dec!(10.00))).unwrap();
    assert_eq!(
        second.accounts().unwrap().checking.balance,
        dec!(127533.82)
    );
}
