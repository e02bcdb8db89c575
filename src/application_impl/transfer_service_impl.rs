use super::{parse_amount, parse_currency};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{PaymentPlatform, PlatformError};
use crate::logger::*;
use std::sync::Arc;

pub struct RealTransferService {
    platform: Arc<dyn PaymentPlatform>,
}

impl RealTransferService {
    pub fn new(platform: Arc<dyn PaymentPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait::async_trait]
impl TransferService for RealTransferService {
    async fn create_transfer(&self, input: TransferInput) -> Result<Transfer, PaymentsError> {
        let amount = parse_amount(input.amount)?;
        let destination = non_blank(input.destination)
            .map(AccountId)
            .ok_or(PaymentsError::Validation("Destination account is required"))?;
        let currency = parse_currency(input.currency)?;

        let result = self
            .platform
            .create_transfer(NewTransfer {
                amount,
                currency,
                destination,
            })
            .await;

        match result {
            Ok(transfer) => {
                info!(transfer = %transfer.id, destination = %transfer.destination, "created transfer");
                Ok(transfer)
            }
            Err(PlatformError::BalanceInsufficient { message }) => {
                warn!(%amount, "transfer refused for insufficient platform balance: {message}");
                Err(PaymentsError::BalanceInsufficient)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_payout(&self, input: PayoutInput) -> Result<Payout, PaymentsError> {
        let amount = parse_amount(input.amount)?;
        let currency = parse_currency(input.currency)?;
        let account = non_blank(input.account_id).map(AccountId);

        let payout = self
            .platform
            .create_payout(NewPayout {
                amount,
                currency,
                account,
            })
            .await?;
        info!(payout = %payout.id, "created payout");
        Ok(payout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::FakePaymentPlatform;

    #[tokio::test]
    async fn transfer_requires_destination() {
        let service = RealTransferService::new(Arc::new(FakePaymentPlatform::new()));
        let err = service
            .create_transfer(TransferInput {
                amount: Some(100),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentsError::Validation("Destination account is required")
        ));
    }

    #[tokio::test]
    async fn insufficient_balance_is_reported_for_retry() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let destination = platform.seed_account(true);
        platform.set_available_balance(Some(50));
        let service = RealTransferService::new(platform.clone());

        let err = service
            .create_transfer(TransferInput {
                amount: Some(100),
                currency: None,
                destination: Some(destination.0),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentsError::BalanceInsufficient));
        assert_eq!(platform.available_balance(), Some(50));
    }

    #[tokio::test]
    async fn payout_from_connected_account() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let account = platform.seed_account(true);
        let service = RealTransferService::new(platform);

        let payout = service
            .create_payout(PayoutInput {
                amount: Some(700),
                currency: Some("cad".into()),
                account_id: Some(account.0),
            })
            .await
            .unwrap();

        assert_eq!(payout.amount, 700);
        assert_eq!(payout.currency, "cad");
        assert_eq!(payout.status, "pending");
    }
}
