use crate::domain_model::*;

/// Client for the external payments platform. One method per vendor call.
#[async_trait::async_trait]
pub trait PaymentPlatform: Send + Sync {
    async fn list_customers(
        &self,
        page: PageRequest,
    ) -> Result<Page<CustomerRecord>, PlatformError>;

    async fn create_customer(&self, customer: NewCustomer)
    -> Result<CustomerRecord, PlatformError>;

    async fn create_account(&self, account: NewAccount) -> Result<Account, PlatformError>;

    async fn retrieve_account(&self, account_id: &AccountId) -> Result<Account, PlatformError>;

    async fn create_account_link(
        &self,
        link: NewAccountLink,
    ) -> Result<AccountLink, PlatformError>;

    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PlatformError>;

    async fn create_setup_intent(
        &self,
        intent: NewSetupIntent,
    ) -> Result<SetupIntent, PlatformError>;

    async fn list_payment_methods(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<PaymentMethod>, PlatformError>;

    async fn detach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
    ) -> Result<PaymentMethod, PlatformError>;

    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Transfer, PlatformError>;

    async fn create_payout(&self, payout: NewPayout) -> Result<Payout, PlatformError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    BalanceInsufficient { message: String },
    #[error("{message}")]
    Card {
        message: String,
        code: Option<String>,
    },
    #[error("{message}")]
    InvalidRequest {
        message: String,
        code: Option<String>,
    },
    #[error("{message}")]
    Authentication { message: String },
    #[error("{message}")]
    RateLimited { message: String },
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    pub fn code(&self) -> Option<&str> {
        match self {
            PlatformError::NotFound { .. } => Some("resource_missing"),
            PlatformError::BalanceInsufficient { .. } => Some("balance_insufficient"),
            PlatformError::RateLimited { .. } => Some("rate_limit"),
            PlatformError::Card { code, .. }
            | PlatformError::InvalidRequest { code, .. }
            | PlatformError::Api { code, .. } => code.as_deref(),
            PlatformError::Authentication { .. } | PlatformError::Transport(_) => None,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            PlatformError::NotFound { .. }
            | PlatformError::BalanceInsufficient { .. }
            | PlatformError::InvalidRequest { .. } => "invalid_request_error",
            PlatformError::Card { .. } => "card_error",
            PlatformError::Authentication { .. } => "authentication_error",
            PlatformError::RateLimited { .. } => "rate_limit_error",
            PlatformError::Api { .. } => "api_error",
            PlatformError::Transport(_) => "api_connection_error",
        }
    }
}
