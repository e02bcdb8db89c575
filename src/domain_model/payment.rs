use super::{AccountId, Amount, Currency, CustomerId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub amount: Amount,
    pub currency: Currency,
    pub customer: Option<CustomerId>,
    pub destination: Option<AccountId>,
    pub application_fee: Option<Amount>,
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub customer: Option<CustomerId>,
}

#[derive(Debug, Clone)]
pub struct NewSetupIntent {
    pub customer: CustomerId,
}

#[derive(Debug, Clone)]
pub struct SetupIntent {
    pub id: String,
    pub client_secret: String,
    pub status: String,
    pub customer: CustomerId,
}

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(pub String);

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub kind: String,
    pub card: Option<CardDetails>,
}
