use super::PaymentsError;
use crate::domain_model::{Account, AccountLink};

#[derive(Debug, Default)]
pub struct CreateAccountInput {
    pub email: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default)]
pub struct OnboardingLinkInput {
    pub account_id: Option<String>,
    pub refresh_url: Option<String>,
    pub return_url: Option<String>,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    async fn create_account(&self, input: CreateAccountInput) -> Result<Account, PaymentsError>;

    async fn create_onboarding_link(
        &self,
        input: OnboardingLinkInput,
    ) -> Result<AccountLink, PaymentsError>;

    async fn account_status(&self, account_id: &str) -> Result<Account, PaymentsError>;
}
