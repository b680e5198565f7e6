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

//! Display helpers in German (de-DE) conventions.
//!
//! Times are rendered in UTC.
//!
//! ```
//! use bank_ledger_rs::format::format_currency;
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(format_currency(dec!(127543.82), "EUR"), "127.543,82\u{a0}€");
//! ```

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Separator between amount and currency symbol.
const NBSP: char = '\u{a0}';

const MONTHS: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
    "Dez.",
];

fn symbol(currency: &str) -> &str {
    match currency {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        "CHF" => "CHF",
        "JPY" => "¥",
        other => other,
    }
}

/// `-1234.5` in EUR becomes `-1.234,50 €`.
///
/// Rounds half away from zero to cents.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{cents}{NBSP}{}", symbol(currency))
}

/// `Today`, `Yesterday`, or a short day-month date such as `15. Aug.`.
pub fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative(date, now).unwrap_or_else(|| {
        format!("{}. {}", date.day(), MONTHS_SHORT[date.month0() as usize])
    })
}

/// Like [`format_date`] but with the year: `15. Aug. 2023`.
pub fn format_date_with_year(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative(date, now).unwrap_or_else(|| {
        format!(
            "{}. {} {}",
            date.day(),
            MONTHS_SHORT[date.month0() as usize],
            date.year()
        )
    })
}

/// Long date and time: `15. August 2023 um 10:30`.
pub fn format_date_time(date: DateTime<Utc>) -> String {
    format!(
        "{}. {} {} um {:02}:{:02}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year(),
        date.hour(),
        date.minute()
    )
}

fn relative(date: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let age = now - date;
    if age < Duration::days(1) {
        Some("Today".to_string())
    } else if age < Duration::days(2) {
        Some("Yesterday".to_string())
    } else {
        None
    }
}
