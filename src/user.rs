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

//! User profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Opaque avatar reference. Image handling lives elsewhere.
    #[serde(default)]
    pub avatar: Option<String>,
    pub account_created: DateTime<Utc>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Overwrites every field present in `update`.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
    }
}

/// Partial profile update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The profile as seen by the front-end, enriched from the user registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub account_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

/// One entry of the user registry blob, a JSON object keyed by user id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegistryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub is_online: Option<bool>,
}

pub(crate) type UserRegistry = HashMap<String, RegistryEntry>;

impl CurrentUser {
    pub(crate) const DEFAULT_STATUS: &'static str = "active";

    /// Looks `profile` up in `registry` by email.
    ///
    /// A matching entry supplies the status, online flag and id.
    pub(crate) fn resolve(profile: UserProfile, registry: Option<&UserRegistry>) -> Self {
        let entry = registry.and_then(|registry| {
            registry
                .values()
                .find(|entry| entry.email.as_deref() == Some(profile.email.as_str()))
        });

        match entry {
            Some(entry) => {
                let mut profile = profile;
                if let Some(id) = &entry.id {
                    profile.id = id.clone();
                }
                Self {
                    profile,
                    account_status: entry
                        .account_status
                        .clone()
                        .unwrap_or_else(|| Self::DEFAULT_STATUS.to_string()),
                    is_online: entry.is_online,
                }
            }
            None => Self {
                profile,
                account_status: Self::DEFAULT_STATUS.to_string(),
                is_online: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> UserProfile {
        UserProfile {
            id: "USR-001".into(),
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            email: "ada@example.com".into(),
            phone: "+44 20 0000 0000".into(),
            avatar: None,
            account_created: Utc.with_ymd_and_hms(2023, 8, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut p = profile();
        p.apply(ProfileUpdate {
            phone: Some("+44 20 1111 1111".into()),
            ..Default::default()
        });
        assert_eq!(p.phone, "+44 20 1111 1111");
        assert_eq!(p.first_name, "Ada");
        assert_eq!(p.full_name(), "Ada Byron");
    }

    #[test]
    fn resolve_without_registry_is_active() {
        let user = CurrentUser::resolve(profile(), None);
        assert_eq!(user.account_status, "active");
        assert_eq!(user.is_online, None);
        assert_eq!(user.profile.id, "USR-001");
    }

    #[test]
    fn resolve_uses_matching_registry_entry() {
        let registry: UserRegistry = serde_json::from_str(
            r#"{
                "u1": {"id": "USR-777", "email": "ada@example.com", "accountStatus": "suspended", "isOnline": true},
                "u2": {"id": "USR-888", "email": "other@example.com"}
            }"#,
        )
        .unwrap();
        let user = CurrentUser::resolve(profile(), Some(&registry));
        assert_eq!(user.account_status, "suspended");
        assert_eq!(user.is_online, Some(true));
        assert_eq!(user.profile.id, "USR-777");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["accountStatus"], "suspended");
    }
}
