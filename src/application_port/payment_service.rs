use super::PaymentsError;
use crate::domain_model::{PaymentIntent, PaymentMethod, SetupIntent};

#[derive(Debug, Default)]
pub struct PaymentIntentInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub user_id: Option<String>,
    pub destination_account_id: Option<String>,
    pub application_fee_amount: Option<i64>,
}

#[derive(Debug, Default)]
pub struct SetupIntentInput {
    pub user_id: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_payment_intent(
        &self,
        input: PaymentIntentInput,
    ) -> Result<PaymentIntent, PaymentsError>;

    async fn create_setup_intent(&self, input: SetupIntentInput)
    -> Result<SetupIntent, PaymentsError>;

    async fn list_payment_methods(
        &self,
        user_id: Option<String>,
    ) -> Result<Vec<PaymentMethod>, PaymentsError>;

    async fn delete_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, PaymentsError>;
}
