use crate::domain_model::UserId;
use crate::domain_port::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("customer creation failed: {0}")]
    Platform(#[from] PlatformError),
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentsError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Insufficient platform balance. Please retry the transfer later.")]
    BalanceInsufficient,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl From<IdentityError> for PaymentsError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Platform(e) => PaymentsError::Platform(e),
        }
    }
}

pub fn require_user_id(raw: Option<&str>) -> Result<UserId, PaymentsError> {
    raw.and_then(UserId::parse)
        .ok_or(PaymentsError::Validation("userId is required"))
}

/// Trims the value and treats blank input as absent.
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
