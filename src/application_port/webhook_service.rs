#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    pub kind: String,
    pub account: Option<String>,
    pub livemode: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook endpoint is not configured")]
    NotConfigured,
    #[error("Missing webhook signature")]
    MissingSignature,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Webhook timestamp outside tolerance")]
    TimestampOutOfTolerance,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

#[async_trait::async_trait]
pub trait WebhookService: Send + Sync {
    async fn handle(&self, payload: &[u8], signature: Option<&str>)
    -> Result<WebhookEvent, WebhookError>;
}
