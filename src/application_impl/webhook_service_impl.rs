use crate::application_port::{WebhookError, WebhookEvent, WebhookService};
use crate::logger::*;
use chrono::Utc;
use hmac::{Hmac, KeyInit, Mac};
use serde::Deserialize;
use sha2::Sha256;

pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    account: Option<String>,
    #[serde(default)]
    livemode: bool,
}

/// Verifies `t=<unix>,v1=<hex>` signature headers with HMAC-SHA256 over `"<t>.<body>"`.
pub struct SignedWebhookService {
    secret: Option<String>,
    tolerance_secs: u64,
}

impl SignedWebhookService {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub(crate) fn verify_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, WebhookError> {
        let secret = self.secret.as_deref().ok_or(WebhookError::NotConfigured)?;
        let header = signature.ok_or(WebhookError::MissingSignature)?;

        let mut timestamp = None;
        let mut candidates = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }
        // the MAC covers the timestamp text exactly as sent
        let signed_timestamp = timestamp.ok_or(WebhookError::InvalidSignature)?;
        let timestamp = signed_timestamp
            .parse::<i64>()
            .map_err(|_| WebhookError::InvalidSignature)?;
        if candidates.is_empty() {
            return Err(WebhookError::InvalidSignature);
        }

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(signed_timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let matched = candidates.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|expected| mac.clone().verify_slice(&expected).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }
        if now.abs_diff(timestamp) > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let raw: RawEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
        Ok(WebhookEvent {
            id: raw.id,
            kind: raw.kind,
            account: raw.account,
            livemode: raw.livemode,
        })
    }
}

#[async_trait::async_trait]
impl WebhookService for SignedWebhookService {
    async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, WebhookError> {
        let event = self.verify_at(payload, signature, Utc::now().timestamp())?;
        info!(
            event_id = %event.id,
            event_type = %event.kind,
            account = ?event.account,
            livemode = event.livemode,
            "received webhook event"
        );
        Ok(event)
    }
}

#[cfg(test)]
pub(crate) fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    sign_raw(secret, &timestamp.to_string(), payload)
}

#[cfg(test)]
fn sign_raw(secret: &str, timestamp: &str, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}
