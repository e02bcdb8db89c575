use crate::application_port::*;
use crate::domain_model::{Account, AccountId, AccountLink, NewAccount, NewAccountLink};
use crate::domain_port::PaymentPlatform;
use crate::logger::*;
use std::sync::Arc;

const DEFAULT_COUNTRY: &str = "US";

/// Where the onboarding flow sends the user back to when the request does not say.
#[derive(Debug, Clone)]
pub struct OnboardingUrls {
    pub refresh_url: String,
    pub return_url: String,
}

pub struct RealAccountService {
    platform: Arc<dyn PaymentPlatform>,
    onboarding: OnboardingUrls,
}

impl RealAccountService {
    pub fn new(platform: Arc<dyn PaymentPlatform>, onboarding: OnboardingUrls) -> Self {
        Self {
            platform,
            onboarding,
        }
    }
}

fn parse_country(raw: Option<String>) -> Result<String, PaymentsError> {
    let country = non_blank(raw)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
    if country.len() == 2 && country.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(country)
    } else {
        Err(PaymentsError::Validation("Invalid country"))
    }
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn create_account(&self, input: CreateAccountInput) -> Result<Account, PaymentsError> {
        let email = non_blank(input.email).ok_or(PaymentsError::Validation("Email is required"))?;
        let country = parse_country(input.country)?;

        let account = self
            .platform
            .create_account(NewAccount { email, country })
            .await?;
        info!(account_id = %account.id, "created connected account");
        Ok(account)
    }

    async fn create_onboarding_link(
        &self,
        input: OnboardingLinkInput,
    ) -> Result<AccountLink, PaymentsError> {
        let account = non_blank(input.account_id)
            .map(AccountId)
            .ok_or(PaymentsError::Validation("accountId is required"))?;

        let link = NewAccountLink {
            account,
            refresh_url: non_blank(input.refresh_url)
                .unwrap_or_else(|| self.onboarding.refresh_url.clone()),
            return_url: non_blank(input.return_url)
                .unwrap_or_else(|| self.onboarding.return_url.clone()),
        };
        Ok(self.platform.create_account_link(link).await?)
    }

    async fn account_status(&self, account_id: &str) -> Result<Account, PaymentsError> {
        let account = non_blank(Some(account_id.to_string()))
            .map(AccountId)
            .ok_or(PaymentsError::Validation("accountId is required"))?;
        Ok(self.platform.retrieve_account(&account).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::PlatformError;
    use crate::infra_memory::FakePaymentPlatform;

    fn service(platform: &Arc<FakePaymentPlatform>) -> RealAccountService {
        RealAccountService::new(
            platform.clone(),
            OnboardingUrls {
                refresh_url: "https://app.example.test/reauth".into(),
                return_url: "https://app.example.test/return".into(),
            },
        )
    }

    #[tokio::test]
    async fn create_account_requires_email() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let err = service(&platform)
            .create_account(CreateAccountInput {
                email: Some("  ".into()),
                country: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentsError::Validation("Email is required")));
    }

    #[tokio::test]
    async fn create_account_rejects_bad_country() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let err = service(&platform)
            .create_account(CreateAccountInput {
                email: Some("seller@example.test".into()),
                country: Some("USA".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentsError::Validation("Invalid country")));
    }

    #[tokio::test]
    async fn new_account_needs_onboarding() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let service = service(&platform);
        let account = service
            .create_account(CreateAccountInput {
                email: Some("seller@example.test".into()),
                country: Some("gb".into()),
            })
            .await
            .unwrap();

        let status = service.account_status(&account.id.0).await.unwrap();
        assert!(!status.onboarding_complete());
        assert!(!status.requirements_due.is_empty());

        let link = service
            .create_onboarding_link(OnboardingLinkInput {
                account_id: Some(account.id.0.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(link.url.contains(&account.id.0));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let err = service(&platform)
            .account_status("acct_missing")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentsError::Platform(PlatformError::NotFound { .. })
        ));
    }
}
