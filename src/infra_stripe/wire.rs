use crate::domain_model::*;
use crate::domain_port::PlatformError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> List<T> {
    pub fn into_page<U: From<T>>(self) -> Page<U> {
        Page {
            data: self.data.into_iter().map(U::from).collect(),
            has_more: self.has_more,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<StripeCustomer> for CustomerRecord {
    fn from(c: StripeCustomer) -> Self {
        CustomerRecord {
            id: CustomerId(c.id),
            email: c.email,
            metadata: c.metadata,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub currently_due: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeAccount {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
    #[serde(default)]
    pub details_submitted: bool,
    pub requirements: Option<Requirements>,
}

impl From<StripeAccount> for Account {
    fn from(a: StripeAccount) -> Self {
        Account {
            id: AccountId(a.id),
            email: a.email,
            charges_enabled: a.charges_enabled,
            payouts_enabled: a.payouts_enabled,
            details_submitted: a.details_submitted,
            requirements_due: a.requirements.unwrap_or_default().currently_due,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeAccountLink {
    pub url: String,
    pub expires_at: i64,
}

impl From<StripeAccountLink> for AccountLink {
    fn from(l: StripeAccountLink) -> Self {
        AccountLink {
            url: l.url,
            expires_at: DateTime::<Utc>::from_timestamp(l.expires_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub customer: Option<String>,
}

impl From<StripePaymentIntent> for PaymentIntent {
    fn from(p: StripePaymentIntent) -> Self {
        PaymentIntent {
            id: p.id,
            client_secret: p.client_secret.unwrap_or_default(),
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            customer: p.customer.map(CustomerId),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeSetupIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
    pub customer: Option<String>,
}

impl StripeSetupIntent {
    pub fn into_domain(self, requested: CustomerId) -> SetupIntent {
        SetupIntent {
            id: self.id,
            client_secret: self.client_secret.unwrap_or_default(),
            status: self.status,
            customer: self.customer.map(CustomerId).unwrap_or(requested),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub card: Option<StripeCard>,
}

impl From<StripePaymentMethod> for PaymentMethod {
    fn from(m: StripePaymentMethod) -> Self {
        PaymentMethod {
            id: PaymentMethodId(m.id),
            kind: m.kind,
            card: m.card.map(|c| CardDetails {
                brand: c.brand,
                last4: c.last4,
                exp_month: c.exp_month,
                exp_year: c.exp_year,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeTransfer {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub destination: String,
}

impl From<StripeTransfer> for Transfer {
    fn from(t: StripeTransfer) -> Self {
        Transfer {
            id: t.id,
            amount: t.amount,
            currency: t.currency,
            destination: AccountId(t.destination),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripePayout {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub arrival_date: Option<i64>,
}

impl From<StripePayout> for Payout {
    fn from(p: StripePayout) -> Self {
        Payout {
            id: p.id,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            arrival_date: p.arrival_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Maps a non-2xx response into the closed error set.
pub fn map_error(status: u16, body: &[u8]) -> PlatformError {
    let parsed = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let (kind, code, message) = match parsed {
        Some(e) => (e.kind, e.code, e.message),
        None => (None, None, None),
    };
    let message = message.unwrap_or_else(|| format!("platform returned HTTP {}", status));

    match (code.as_deref(), kind.as_deref(), status) {
        (Some("balance_insufficient"), _, _) => PlatformError::BalanceInsufficient { message },
        (Some("resource_missing"), _, _) | (_, _, 404) => PlatformError::NotFound { message },
        (_, Some("card_error"), _) => PlatformError::Card { message, code },
        (_, Some("authentication_error"), _) | (_, _, 401) => {
            PlatformError::Authentication { message }
        }
        (_, Some("rate_limit_error"), _) | (_, _, 429) => PlatformError::RateLimited { message },
        (_, Some("invalid_request_error"), _) => PlatformError::InvalidRequest { message, code },
        _ => PlatformError::Api { message, code },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(kind: &str, code: Option<&str>, message: &str) -> Vec<u8> {
        serde_json::json!({
            "error": { "type": kind, "code": code, "message": message }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn balance_shortfall_is_its_own_variant() {
        let err = map_error(
            400,
            &error_body(
                "invalid_request_error",
                Some("balance_insufficient"),
                "You have insufficient available funds in your Stripe account.",
            ),
        );
        assert!(matches!(err, PlatformError::BalanceInsufficient { .. }));
        assert_eq!(err.code(), Some("balance_insufficient"));
    }

    #[test]
    fn missing_resources_are_not_found() {
        let err = map_error(
            404,
            &error_body("invalid_request_error", Some("resource_missing"), "No such account: 'acct_x'"),
        );
        assert_eq!(
            err,
            PlatformError::NotFound {
                message: "No such account: 'acct_x'".into()
            }
        );
        assert!(matches!(map_error(404, b"not json"), PlatformError::NotFound { .. }));
    }

    #[test]
    fn vendor_code_and_type_pass_through() {
        let err = map_error(
            402,
            &error_body("card_error", Some("card_declined"), "Your card was declined."),
        );
        assert_eq!(err.code(), Some("card_declined"));
        assert_eq!(err.error_type(), "card_error");
        assert_eq!(err.to_string(), "Your card was declined.");

        let err = map_error(
            400,
            &error_body("invalid_request_error", Some("parameter_missing"), "Missing required param: amount."),
        );
        assert!(matches!(err, PlatformError::InvalidRequest { .. }));
        assert_eq!(err.code(), Some("parameter_missing"));
    }

    #[test]
    fn status_fallbacks() {
        assert!(matches!(map_error(401, b""), PlatformError::Authentication { .. }));
        assert!(matches!(map_error(429, b""), PlatformError::RateLimited { .. }));
        let err = map_error(503, b"");
        assert_eq!(err.to_string(), "platform returned HTTP 503");
        assert_eq!(err.error_type(), "api_error");
    }

    #[test]
    fn account_conversion_collects_due_requirements() {
        let raw = serde_json::json!({
            "id": "acct_1",
            "object": "account",
            "charges_enabled": true,
            "payouts_enabled": false,
            "details_submitted": true,
            "requirements": { "currently_due": ["external_account"] }
        });
        let account: Account = serde_json::from_value::<StripeAccount>(raw).unwrap().into();
        assert_eq!(account.id, AccountId("acct_1".into()));
        assert_eq!(account.requirements_due, vec!["external_account".to_string()]);
        assert!(!account.onboarding_complete());
    }

    #[test]
    fn customer_list_becomes_page() {
        let raw = serde_json::json!({
            "object": "list",
            "data": [
                { "id": "cus_1", "email": null, "metadata": { "user_id": "u1" } },
                { "id": "cus_2", "metadata": {} }
            ],
            "has_more": true
        });
        let page: Page<CustomerRecord> = serde_json::from_value::<List<StripeCustomer>>(raw)
            .unwrap()
            .into_page();
        assert!(page.has_more);
        assert_eq!(page.data.len(), 2);
        assert!(page.data[0].belongs_to(&UserId::parse("u1").unwrap()));
    }
}
