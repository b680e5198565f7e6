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

//! Ledger configuration.
//!
//! Every field has a default, so an empty TOML file is a valid configuration:
//!
//! ```toml
//! storage_key = "bankState"
//! transaction_limit = 50
//! clearance_days = 2
//!
//! [credentials]
//! email = "alexander.mitchell@email.com"
//! password = "password123"
//!
//! [backend]
//! url = "https://example.invalid"
//! key = "public-anon-key"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Upper bound for `clearance_days`.
pub const MAX_CLEARANCE_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Storage key holding the canonical document.
    pub storage_key: String,
    /// Keys checked, in order, for a legacy document to migrate when
    /// `storage_key` is empty.
    pub legacy_keys: Vec<String>,
    /// Key of the optional user registry consulted by `current_user`.
    pub user_registry_key: String,
    /// Currency stamped on new transactions.
    pub currency: String,
    /// Default page size for `transactions(None)`.
    pub transaction_limit: usize,
    /// Days between a check deposit and its estimated clearance.
    pub clearance_days: u32,
    pub credentials: Credentials,
    pub backend: Option<BackendConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: "bankState".to_string(),
            legacy_keys: vec![
                "vanstraBankState".to_string(),
                "vanstraBankingState".to_string(),
            ],
            user_registry_key: "vanstraUsers".to_string(),
            currency: "EUR".to_string(),
            transaction_limit: 50,
            clearance_days: 2,
            credentials: Credentials::default(),
            backend: None,
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clearance_days > MAX_CLEARANCE_DAYS {
            return Err(ConfigError::Invalid(format!(
                "clearance_days must be at most {MAX_CLEARANCE_DAYS}, got {}",
                self.clearance_days
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The backend settings, if both url and key are filled in.
    pub fn configured_backend(&self) -> Option<&BackendConfig> {
        self.backend.as_ref().filter(|b| b.is_configured())
    }
}

/// The single demo login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "alexander.mitchell@email.com".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl Credentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

/// Remote backend endpoint and access key.
///
/// Only recorded; this crate contains no backend client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub key: String,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.transaction_limit, 50);
        assert_eq!(config.clearance_days, 2);
        assert!(config.configured_backend().is_none());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = LedgerConfig::from_toml_str(
            r#"
            storage_key = "demo"
            transaction_limit = 10

            [credentials]
            email = "demo@example.com"
            password = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_key, "demo");
        assert_eq!(config.transaction_limit, 10);
        assert_eq!(config.currency, "EUR");
        assert!(config.credentials.matches("demo@example.com", "hunter2"));
        assert!(!config.credentials.matches("demo@example.com", "hunter3"));
    }

    #[test]
    fn backend_needs_url_and_key() {
        let config = LedgerConfig::from_toml_str(
            r#"
            [backend]
            url = "https://xyz.example.co"
            "#,
        )
        .unwrap();
        assert!(config.backend.is_some());
        assert!(config.configured_backend().is_none());

        let config = LedgerConfig::from_toml_str(
            r#"
            [backend]
            url = "https://xyz.example.co"
            key = "anon"
            "#,
        )
        .unwrap();
        assert!(config.configured_backend().is_some());
    }

    #[test]
    fn credentials_fill_missing_fields() {
        let config = LedgerConfig::from_toml_str(
            r#"
            [credentials]
            email = "demo@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.credentials.email, "demo@example.com");
        assert_eq!(config.credentials.password, "password123");
    }

    #[test]
    fn clearance_days_are_bounded() {
        let config = LedgerConfig::from_toml_str("clearance_days = 365").unwrap();
        assert_eq!(config.clearance_days, 365);

        let err = LedgerConfig::from_toml_str("clearance_days = 200000000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LedgerConfig::from_toml_str("clearance_days = -5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = LedgerConfig::from_toml_str("transaction_limit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
