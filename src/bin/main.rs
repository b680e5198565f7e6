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

use anyhow::{Context, Result};
use bank_ledger_rs::export::write_transactions_csv;
use bank_ledger_rs::format::{format_currency, format_date, format_date_time};
use bank_ledger_rs::{
    AccountKind, BillPayment, CheckImages, DepositRequest, ExternalRecipient, FileStorage,
    Ledger, LedgerConfig, NewBiller, ProfileUpdate, TicketPriority, TicketRequest, Transaction,
    TransactionId, TransferRequest,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bank Ledger - Demo banking state store
///
/// Keeps balances, the transaction log, deposits, payees and support tickets
/// in a JSON document under the data directory.
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "A demo banking ledger backed by a local JSON document", long_about = None)]
struct Cli {
    /// Directory holding the stored documents
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show account balances and the total
    Balance,
    /// List recent transactions, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one transaction as JSON
    Show { id: String },
    /// Move money between own accounts or to an external recipient
    Transfer {
        #[arg(long, default_value = "checking")]
        from: AccountKind,
        /// Own account to credit
        #[arg(long, conflicts_with = "recipient")]
        to: Option<AccountKind>,
        /// External recipient name
        #[arg(long, requires_all = ["bank", "account_number"])]
        recipient: Option<String>,
        #[arg(long)]
        bank: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
        /// Add the external recipient to saved recipients
        #[arg(long)]
        save: bool,
        #[arg(long)]
        note: Option<String>,
        amount: Decimal,
    },
    /// Submit a mobile check deposit into checking
    Deposit {
        amount: Decimal,
        /// Reference to the front image
        #[arg(long)]
        front: Option<String>,
        /// Reference to the back image
        #[arg(long)]
        back: Option<String>,
    },
    /// Pay a bill from checking
    PayBill {
        biller: String,
        amount: Decimal,
        #[arg(long, default_value = "Bills")]
        category: String,
        #[arg(long, default_value = "")]
        reference: String,
    },
    /// Save a new biller
    AddBiller {
        name: String,
        #[arg(long, default_value = "Other")]
        category: String,
        #[arg(long)]
        account_number: String,
    },
    /// Open a support ticket
    Ticket {
        subject: String,
        message: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long)]
        priority: Option<TicketPriority>,
    },
    /// Log in with the demo credentials
    Login { email: String, password: String },
    Logout,
    /// Show the current user
    Whoami,
    /// Update profile fields
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List pending check deposits
    Pending,
    Billers,
    Recipients,
    Tickets,
    /// Write the transaction log as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all state with fresh demo data
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    let dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let storage = FileStorage::open(&dir)
        .with_context(|| format!("opening data dir {}", dir.display()))?;
    let ledger = Ledger::new(Arc::new(storage)).with_config(config);

    run(&ledger, cli.command, &mut io::stdout().lock())
}

fn default_data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "BankLedger", "bank-ledger")
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

fn run<W: Write>(ledger: &Ledger, command: Command, out: &mut W) -> Result<()> {
    let currency = ledger.config().currency.clone();

    match command {
        Command::Balance => {
            let accounts = ledger.accounts()?;
            for (kind, account) in accounts.iter() {
                writeln!(
                    out,
                    "{:<11} {:<22} {:>8} {:>18}",
                    kind,
                    account.name,
                    account.number,
                    format_currency(account.balance, &account.currency)
                )?;
            }
            writeln!(out, "{:<43} {:>18}", "total", format_currency(accounts.total(), &currency))?;
        }
        Command::History { limit } => {
            let now = ledger.now();
            for tx in ledger.transactions(limit)? {
                write_line(out, &tx, now)?;
            }
        }
        Command::Show { id } => {
            let tx = ledger
                .transaction(&TransactionId(id.clone()))?
                .with_context(|| format!("no transaction {id}"))?;
            print_json(out, &tx)?;
            writeln!(out, "{}", format_date_time(tx.date))?;
        }
        Command::Transfer {
            from,
            to,
            recipient,
            bank,
            account_number,
            save,
            note,
            amount,
        } => {
            let mut request = match (to, recipient) {
                (Some(to), _) => TransferRequest::internal(from, to, amount),
                (None, Some(name)) => TransferRequest::external(
                    from,
                    ExternalRecipient {
                        name,
                        bank: bank.unwrap_or_default(),
                        account_number: account_number.unwrap_or_default(),
                        save,
                    },
                    amount,
                ),
                (None, None) => anyhow::bail!("either --to or --recipient is required"),
            };
            if let Some(note) = note {
                request = request.with_note(note);
            }
            let tx = ledger.transfer(request)?;
            write_line(out, &tx, ledger.now())?;
        }
        Command::Deposit { amount, front, back } => {
            let deposit = ledger.submit_deposit(DepositRequest {
                amount,
                images: CheckImages {
                    front_image: front,
                    back_image: back,
                },
            })?;
            writeln!(
                out,
                "{} {} pending, clears {}",
                deposit.id,
                format_currency(deposit.amount, &deposit.currency),
                format_date_time(deposit.estimated_clearance)
            )?;
        }
        Command::PayBill {
            biller,
            amount,
            category,
            reference,
        } => {
            let tx = ledger.pay_bill(BillPayment {
                biller_name: biller,
                amount,
                category,
                reference_number: reference,
            })?;
            write_line(out, &tx, ledger.now())?;
        }
        Command::AddBiller {
            name,
            category,
            account_number,
        } => {
            let biller = ledger.add_biller(NewBiller {
                name,
                category,
                account_number,
            })?;
            print_json(out, &biller)?;
        }
        Command::Ticket {
            subject,
            message,
            category,
            priority,
        } => {
            let ticket = ledger.submit_ticket(TicketRequest {
                subject,
                category,
                message,
                priority,
            })?;
            writeln!(out, "{} {} ({})", ticket.id, ticket.subject, ticket.priority)?;
        }
        Command::Login { email, password } => {
            let user = ledger.login(&email, &password)?;
            writeln!(out, "Welcome, {}", user.full_name())?;
        }
        Command::Logout => {
            ledger.logout()?;
            writeln!(out, "Logged out")?;
        }
        Command::Whoami => {
            let authenticated = ledger.is_authenticated()?;
            let user = ledger.current_user()?;
            print_json(out, &user)?;
            if !authenticated {
                writeln!(out, "(not logged in)")?;
            }
        }
        Command::Profile {
            first_name,
            last_name,
            email,
            phone,
            avatar,
        } => {
            let mut user = ledger.update_profile(ProfileUpdate {
                first_name,
                last_name,
                email,
                phone,
            })?;
            if let Some(avatar) = avatar {
                user = ledger.update_avatar(avatar)?;
            }
            print_json(out, &user)?;
        }
        Command::Pending => print_json(out, &ledger.pending_deposits()?)?,
        Command::Billers => print_json(out, &ledger.billers()?)?,
        Command::Recipients => print_json(out, &ledger.recipients()?)?,
        Command::Tickets => print_json(out, &ledger.tickets()?)?,
        Command::Export { output } => {
            let transactions = ledger.transactions(Some(usize::MAX))?;
            match output {
                Some(path) => export_to(&path, &transactions)?,
                None => write_transactions_csv(&transactions, &mut *out)?,
            }
        }
        Command::Reset => {
            let doc = ledger.reset()?;
            writeln!(
                out,
                "Reset to demo data, total {}",
                format_currency(doc.total_balance(), &currency)
            )?;
        }
    }

    Ok(())
}

fn export_to(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_transactions_csv(transactions, file)?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, tx: &Transaction, now: DateTime<Utc>) -> io::Result<()> {
    let pending = if tx.is_pending() { " (pending)" } else { "" };
    writeln!(
        out,
        "{:<9} {:<34} {:>16}{}  {}",
        format_date(tx.date, now),
        tx.description,
        format_currency(tx.amount, &tx.currency),
        pending,
        tx.id
    )
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_ledger_rs::MemoryStorage;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(MemoryStorage::new()))
    }

    fn run_to_string(ledger: &Ledger, args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("bank-ledger").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run(ledger, cli.command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn balance_lists_accounts_and_total() {
        let out = run_to_string(&ledger(), &["balance"]);
        assert!(out.contains("127.543,82\u{a0}€"));
        assert!(out.contains("242.239,97\u{a0}€"));
    }

    #[test]
    fn internal_transfer_via_cli() {
        let ledger = ledger();
        run_to_string(&ledger, &["transfer", "--to", "savings", "1000.00"]);
        let accounts = ledger.accounts().unwrap();
        assert_eq!(accounts.checking.balance, Decimal::new(12654382, 2));
        assert_eq!(accounts.savings.balance, Decimal::new(4623015, 2));
    }

    #[test]
    fn transfer_needs_a_destination() {
        let cli = Cli::try_parse_from(["bank-ledger", "transfer", "10"]).unwrap();
        assert!(run(&ledger(), cli.command, &mut Vec::new()).is_err());
    }

    #[test]
    fn deposit_via_cli_stays_pending() {
        let ledger = ledger();
        let out = run_to_string(&ledger, &["deposit", "100", "--front", "f"]);
        assert!(out.contains("pending"));

        let pending = ledger.pending_deposits().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount, Decimal::new(100, 0));
        assert_eq!(pending[0].images.front_image.as_deref(), Some("f"));
        assert_eq!(pending[0].images.back_image, None);
        assert_eq!(ledger.accounts().unwrap().checking.balance, Decimal::new(12754382, 2));
    }

    #[test]
    fn export_writes_csv_header() {
        let out = run_to_string(&ledger(), &["export"]);
        assert!(out.starts_with("id,date,type,"));
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn rejects_unknown_account() {
        let args = ["bank-ledger", "transfer", "--from", "brokerage", "--to", "savings", "1"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
