use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::PaymentPlatform;
use crate::logger::*;
use std::sync::Arc;

pub struct RealPaymentService {
    identity: Arc<dyn IdentityService>,
    platform: Arc<dyn PaymentPlatform>,
}

impl RealPaymentService {
    pub fn new(identity: Arc<dyn IdentityService>, platform: Arc<dyn PaymentPlatform>) -> Self {
        Self { identity, platform }
    }
}

pub(crate) fn parse_amount(raw: Option<i64>) -> Result<Amount, PaymentsError> {
    raw.and_then(Amount::new)
        .ok_or(PaymentsError::Validation("Valid amount is required"))
}

pub(crate) fn parse_currency(raw: Option<String>) -> Result<Currency, PaymentsError> {
    Currency::parse_or_default(non_blank(raw).as_deref())
        .ok_or(PaymentsError::Validation("Invalid currency"))
}

#[async_trait::async_trait]
impl PaymentService for RealPaymentService {
    async fn create_payment_intent(
        &self,
        input: PaymentIntentInput,
    ) -> Result<PaymentIntent, PaymentsError> {
        let amount = parse_amount(input.amount)?;
        let currency = parse_currency(input.currency)?;
        let destination = non_blank(input.destination_account_id).map(AccountId);
        let application_fee = match input.application_fee_amount {
            None | Some(0) => None,
            Some(raw) => match Amount::new(raw) {
                Some(fee) if fee < amount => Some(fee),
                _ => {
                    return Err(PaymentsError::Validation(
                        "Application fee must be less than amount",
                    ));
                }
            },
        };
        if application_fee.is_some() && destination.is_none() {
            return Err(PaymentsError::Validation(
                "Application fee requires a destination account",
            ));
        }

        let customer = match non_blank(input.user_id) {
            Some(raw) => {
                let user_id = require_user_id(Some(raw.as_str()))?;
                Some(self.identity.resolve_customer(&user_id).await?)
            }
            None => None,
        };

        let intent = self
            .platform
            .create_payment_intent(NewPaymentIntent {
                amount,
                currency,
                customer,
                destination,
                application_fee,
            })
            .await?;
        info!(payment_intent = %intent.id, amount = intent.amount, "created payment intent");
        Ok(intent)
    }

    async fn create_setup_intent(
        &self,
        input: SetupIntentInput,
    ) -> Result<SetupIntent, PaymentsError> {
        let user_id = require_user_id(input.user_id.as_deref())?;
        let customer = self.identity.resolve_customer(&user_id).await?;
        Ok(self
            .platform
            .create_setup_intent(NewSetupIntent { customer })
            .await?)
    }

    async fn list_payment_methods(
        &self,
        user_id: Option<String>,
    ) -> Result<Vec<PaymentMethod>, PaymentsError> {
        let user_id = require_user_id(user_id.as_deref())?;
        let customer = self.identity.resolve_customer(&user_id).await?;
        Ok(self.platform.list_payment_methods(&customer).await?)
    }

    async fn delete_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, PaymentsError> {
        let id = non_blank(Some(payment_method_id.to_string()))
            .map(PaymentMethodId)
            .ok_or(PaymentsError::Validation("paymentMethodId is required"))?;
        let detached = self.platform.detach_payment_method(&id).await?;
        info!(payment_method = %detached.id, "detached payment method");
        Ok(detached)
    }
}
