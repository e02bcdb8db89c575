use super::PaymentsError;
use crate::domain_model::{Payout, Transfer};

#[derive(Debug, Default)]
pub struct TransferInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Default)]
pub struct PayoutInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub account_id: Option<String>,
}

#[async_trait::async_trait]
pub trait TransferService: Send + Sync {
    /// A platform balance shortfall is reported as
    /// [`PaymentsError::BalanceInsufficient`]; the caller is expected to retry later.
    async fn create_transfer(&self, input: TransferInput) -> Result<Transfer, PaymentsError>;

    async fn create_payout(&self, input: PayoutInput) -> Result<Payout, PaymentsError>;
}
