use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connected account on the payments platform.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub requirements_due: Vec<String>,
}

impl Account {
    pub fn onboarding_complete(&self) -> bool {
        self.details_submitted && self.charges_enabled && self.requirements_due.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NewAccountLink {
    pub account: AccountId,
    pub refresh_url: String,
    pub return_url: String,
}

/// Time-limited onboarding reference for a connected account.
#[derive(Debug, Clone)]
pub struct AccountLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
