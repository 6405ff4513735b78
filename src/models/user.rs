// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User records and pagination types for the user-management view.

use serde::{Deserialize, Serialize};

/// Authentication provider whose PENDING accounts display as ACTIVE.
pub const PROVIDER_GOOGLE: &str = "GOOGLE";

/// Account status as stored server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Pending,
    Inactive,
    #[serde(other)]
    Unknown,
}

/// A registered platform user as listed in the admin table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub account_status: AccountStatus,
    /// Registration timestamp, milliseconds since epoch
    pub created_at: i64,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub verified: bool,
    pub provider: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub nic: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl UserRecord {
    /// Status as shown to the administrator.
    ///
    /// OAuth accounts awaiting email verification display as ACTIVE; the
    /// stored status is not mutated.
    pub fn display_status(&self) -> AccountStatus {
        if self.provider == PROVIDER_GOOGLE && self.account_status == AccountStatus::Pending {
            AccountStatus::Active
        } else {
            self.account_status
        }
    }

    /// Target `state` argument for the activation mutation: inverts the
    /// effective (displayed) status.
    pub fn next_activation_state(&self) -> bool {
        self.display_status() != AccountStatus::Active
    }

    /// Full name assembled from the name parts.
    pub fn full_name(&self) -> String {
        let mut name = self.first_name.clone();
        if !self.middle_name.is_empty() {
            name.push(' ');
            name.push_str(&self.middle_name);
        }
        name.push(' ');
        name.push_str(&self.last_name);
        name.trim().to_string()
    }
}

/// Sort direction for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Pagination arguments for the users query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateRequest {
    pub page: u32,
    pub size: u32,
    pub sort: String,
    pub sort_direction: SortDirection,
}

impl Default for PaginateRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort: "id".to_string(),
            sort_direction: SortDirection::Desc,
        }
    }
}

/// One page of users plus paging metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    #[serde(default)]
    pub content: Vec<UserRecord>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub valid_page: bool,
}
