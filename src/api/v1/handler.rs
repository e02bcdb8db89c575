use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use warp::reject;

/// Integer amounts only; anything else reads as absent and fails validation.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_i64))
}

// region customers

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomerRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomerResponse {
    pub user_id: UserId,
    pub customer_id: CustomerId,
}

pub async fn resolve_customer(
    body: ResolveCustomerRequest,
    identity_service: Arc<dyn IdentityService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = require_user_id(body.user_id.as_deref())
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    let customer_id = identity_service
        .resolve_customer(&user_id)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ResolveCustomerResponse {
        user_id,
        customer_id,
    }))
}

// endregion

// region accounts

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub email: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: AccountId,
    pub email: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub requirements_due: Vec<String>,
    pub onboarding_complete: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            onboarding_complete: account.onboarding_complete(),
            account_id: account.id,
            email: account.email,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            details_submitted: account.details_submitted,
            requirements_due: account.requirements_due,
        }
    }
}

pub async fn create_account(
    body: CreateAccountRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = CreateAccountInput {
        email: body.email,
        country: body.country,
    };
    let account = account_service
        .create_account(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&AccountResponse::from(account)))
}

pub async fn account_status(
    account_id: String,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let account = account_service
        .account_status(&account_id)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&AccountResponse::from(account)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLinkRequest {
    pub account_id: Option<String>,
    pub refresh_url: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLinkResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn create_account_link(
    body: AccountLinkRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = OnboardingLinkInput {
        account_id: body.account_id,
        refresh_url: body.refresh_url,
        return_url: body.return_url,
    };
    let link = account_service
        .create_onboarding_link(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&AccountLinkResponse {
        url: link.url,
        expires_at: link.expires_at,
    }))
}

// endregion

// region payments

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub user_id: Option<String>,
    pub destination_account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub application_fee_amount: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub customer_id: Option<CustomerId>,
    pub amount: u64,
    pub currency: String,
    pub status: String,
}

pub async fn create_payment_intent(
    body: PaymentIntentRequest,
    payment_service: Arc<dyn PaymentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = PaymentIntentInput {
        amount: body.amount,
        currency: body.currency,
        user_id: body.user_id,
        destination_account_id: body.destination_account_id,
        application_fee_amount: body.application_fee_amount,
    };
    let intent = payment_service
        .create_payment_intent(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&PaymentIntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
        customer_id: intent.customer,
        amount: intent.amount,
        currency: intent.currency,
        status: intent.status,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentResponse {
    pub setup_intent_id: String,
    pub client_secret: String,
    pub customer_id: CustomerId,
    pub status: String,
}

pub async fn create_setup_intent(
    body: SetupIntentRequest,
    payment_service: Arc<dyn PaymentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let intent = payment_service
        .create_setup_intent(SetupIntentInput {
            user_id: body.user_id,
        })
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&SetupIntentResponse {
        setup_intent_id: intent.id,
        client_secret: intent.client_secret,
        customer_id: intent.customer,
        status: intent.status,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSummary {
    pub id: PaymentMethodId,
    #[serde(rename = "type")]
    pub kind: String,
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,
}

impl From<PaymentMethod> for PaymentMethodSummary {
    fn from(method: PaymentMethod) -> Self {
        let card = method.card;
        PaymentMethodSummary {
            id: method.id,
            kind: method.kind,
            brand: card.as_ref().map(|c| c.brand.clone()),
            last4: card.as_ref().map(|c| c.last4.clone()),
            exp_month: card.as_ref().map(|c| c.exp_month),
            exp_year: card.as_ref().map(|c| c.exp_year),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    pub payment_methods: Vec<PaymentMethodSummary>,
}

pub async fn list_payment_methods(
    query: PaymentMethodsQuery,
    payment_service: Arc<dyn PaymentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let methods = payment_service
        .list_payment_methods(query.user_id)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&PaymentMethodsResponse {
        payment_methods: methods.into_iter().map(PaymentMethodSummary::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct DeletedPaymentMethodResponse {
    pub id: PaymentMethodId,
    pub deleted: bool,
}

pub async fn delete_payment_method(
    payment_method_id: String,
    payment_service: Arc<dyn PaymentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let detached = payment_service
        .delete_payment_method(&payment_method_id)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&DeletedPaymentMethodResponse {
        id: detached.id,
        deleted: true,
    }))
}

// endregion

// region money movement

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub transfer_id: String,
    pub amount: u64,
    pub currency: String,
    pub destination: AccountId,
}

pub async fn create_transfer(
    body: TransferRequest,
    transfer_service: Arc<dyn TransferService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = TransferInput {
        amount: body.amount,
        currency: body.currency,
        destination: body.destination,
    };
    let transfer = transfer_service
        .create_transfer(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&TransferResponse {
        transfer_id: transfer.id,
        amount: transfer.amount,
        currency: transfer.currency,
        destination: transfer.destination,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutResponse {
    pub payout_id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub arrival_date: Option<i64>,
}

pub async fn create_payout(
    body: PayoutRequest,
    transfer_service: Arc<dyn TransferService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = PayoutInput {
        amount: body.amount,
        currency: body.currency,
        account_id: body.account_id,
    };
    let payout = transfer_service
        .create_payout(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&PayoutResponse {
        payout_id: payout.id,
        amount: payout.amount,
        currency: payout.currency,
        status: payout.status,
        arrival_date: payout.arrival_date,
    }))
}

// endregion

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

pub async fn receive_webhook(
    signature: Option<String>,
    payload: warp::hyper::body::Bytes,
    webhook_service: Arc<dyn WebhookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    webhook_service
        .handle(&payload, signature.as_deref())
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&WebhookAck { received: true }))
}
