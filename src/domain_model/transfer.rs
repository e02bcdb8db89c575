use super::{AccountId, Amount, Currency};

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub amount: Amount,
    pub currency: Currency,
    pub destination: AccountId,
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub destination: AccountId,
}

/// Payout from the platform balance, or from a connected account when `account` is set.
#[derive(Debug, Clone)]
pub struct NewPayout {
    pub amount: Amount,
    pub currency: Currency,
    pub account: Option<AccountId>,
}

#[derive(Debug, Clone)]
pub struct Payout {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub arrival_date: Option<i64>,
}
