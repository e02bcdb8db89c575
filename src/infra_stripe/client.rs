//! REST client for a Stripe-compatible payments API.

use super::form::FormParams;
use super::wire::*;
use crate::domain_model::*;
use crate::domain_port::{PaymentPlatform, PlatformError};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument};

const CONNECTED_ACCOUNT_HEADER: &str = "Stripe-Account";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
const PAYMENT_METHOD_PAGE_SIZE: u8 = 100;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct StripePlatform {
    http: reqwest::Client,
    api_base: Url,
    secret_key: String,
}

impl StripePlatform {
    pub fn new(config: StripeConfig) -> anyhow::Result<Self> {
        let api_base = Url::parse(config.api_base.trim_end_matches('/'))?;
        if api_base.cannot_be_a_base() {
            return Err(anyhow::anyhow!("platform api base is not a base URL: {}", api_base));
        }
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("paybridge/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        info!(api_base = %api_base, "created StripePlatform");
        Ok(Self {
            http,
            api_base,
            secret_key: config.secret_key,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], account: Option<&AccountId>) -> RequestBuilder {
        let mut request = self
            .http
            .request(method.clone(), self.url(segments))
            .bearer_auth(&self.secret_key);
        if let Some(account) = account {
            request = request.header(CONNECTED_ACCOUNT_HEADER, account.0.as_str());
        }
        if method == Method::POST {
            request = request.header(IDEMPOTENCY_HEADER, uuid::Uuid::new_v4().to_string());
        }
        request
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &FormParams,
    ) -> Result<T, PlatformError> {
        let request = self
            .request(Method::GET, segments, None)
            .query(query.pairs());
        self.send(request).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: &FormParams,
        account: Option<&AccountId>,
    ) -> Result<T, PlatformError> {
        let request = self
            .request(Method::POST, segments, account)
            .form(form.pairs());
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = map_error(status.as_u16(), &body);
            debug!(status = status.as_u16(), error_type = err.error_type(), "platform call failed: {err}");
            return Err(err);
        }
        serde_json::from_slice(&body).map_err(|e| PlatformError::Api {
            message: format!("unexpected platform response: {}", e),
            code: None,
        })
    }
}

#[async_trait::async_trait]
impl PaymentPlatform for StripePlatform {
    #[instrument(skip(self))]
    async fn list_customers(
        &self,
        page: PageRequest,
    ) -> Result<Page<CustomerRecord>, PlatformError> {
        let query = FormParams::new()
            .push("limit", page.limit)
            .push_opt("starting_after", page.starting_after.as_ref());
        let list: List<StripeCustomer> = self.get(&["customers"], &query).await?;
        Ok(list.into_page())
    }

    #[instrument(skip(self))]
    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, PlatformError> {
        let form = FormParams::new()
            .push_opt("email", customer.email.as_ref())
            .metadata(&customer.metadata());
        let created: StripeCustomer = self.post(&["customers"], &form, None).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn create_account(&self, account: NewAccount) -> Result<Account, PlatformError> {
        let form = FormParams::new()
            .push("type", "express")
            .push("country", &account.country)
            .push("email", &account.email)
            .push("capabilities[card_payments][requested]", true)
            .push("capabilities[transfers][requested]", true);
        let created: StripeAccount = self.post(&["accounts"], &form, None).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn retrieve_account(&self, account_id: &AccountId) -> Result<Account, PlatformError> {
        let account: StripeAccount = self
            .get(&["accounts", &account_id.0], &FormParams::new())
            .await?;
        Ok(account.into())
    }

    #[instrument(skip(self))]
    async fn create_account_link(
        &self,
        link: NewAccountLink,
    ) -> Result<AccountLink, PlatformError> {
        let form = FormParams::new()
            .push("account", &link.account)
            .push("refresh_url", &link.refresh_url)
            .push("return_url", &link.return_url)
            .push("type", "account_onboarding");
        let created: StripeAccountLink = self.post(&["account_links"], &form, None).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PlatformError> {
        let form = FormParams::new()
            .push("amount", intent.amount)
            .push("currency", &intent.currency)
            .push("automatic_payment_methods[enabled]", true)
            .push_opt("customer", intent.customer.as_ref())
            .push_opt("transfer_data[destination]", intent.destination.as_ref())
            .push_opt("application_fee_amount", intent.application_fee);
        let created: StripePaymentIntent = self.post(&["payment_intents"], &form, None).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn create_setup_intent(
        &self,
        intent: NewSetupIntent,
    ) -> Result<SetupIntent, PlatformError> {
        let form = FormParams::new()
            .push("customer", &intent.customer)
            .push("automatic_payment_methods[enabled]", true);
        let created: StripeSetupIntent = self.post(&["setup_intents"], &form, None).await?;
        Ok(created.into_domain(intent.customer))
    }

    #[instrument(skip(self))]
    async fn list_payment_methods(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<PaymentMethod>, PlatformError> {
        let query = FormParams::new()
            .push("type", "card")
            .push("limit", PAYMENT_METHOD_PAGE_SIZE);
        let list: List<StripePaymentMethod> = self
            .get(&["customers", &customer_id.0, "payment_methods"], &query)
            .await?;
        Ok(list.into_page::<PaymentMethod>().data)
    }

    #[instrument(skip(self))]
    async fn detach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
    ) -> Result<PaymentMethod, PlatformError> {
        let detached: StripePaymentMethod = self
            .post(
                &["payment_methods", &payment_method_id.0, "detach"],
                &FormParams::new(),
                None,
            )
            .await?;
        Ok(detached.into())
    }

    #[instrument(skip(self))]
    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Transfer, PlatformError> {
        let form = FormParams::new()
            .push("amount", transfer.amount)
            .push("currency", &transfer.currency)
            .push("destination", &transfer.destination);
        let created: StripeTransfer = self.post(&["transfers"], &form, None).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn create_payout(&self, payout: NewPayout) -> Result<Payout, PlatformError> {
        let form = FormParams::new()
            .push("amount", payout.amount)
            .push("currency", &payout.currency);
        let created: StripePayout = self
            .post(&["payouts"], &form, payout.account.as_ref())
            .await?;
        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(api_base: &str) -> StripePlatform {
        StripePlatform::new(StripeConfig {
            api_base: api_base.into(),
            secret_key: "sk_test_123".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn urls_are_versioned_and_escaped() {
        let p = platform("https://api.stripe.com/");
        assert_eq!(
            p.url(&["customers"]).as_str(),
            "https://api.stripe.com/v1/customers"
        );
        assert_eq!(
            p.url(&["payment_methods", "pm/1", "detach"]).as_str(),
            "https://api.stripe.com/v1/payment_methods/pm%2F1/detach"
        );

        let proxied = platform("http://localhost:12111/stripe");
        assert_eq!(
            proxied.url(&["accounts", "acct_1"]).as_str(),
            "http://localhost:12111/stripe/v1/accounts/acct_1"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = StripePlatform::new(StripeConfig {
            api_base: "mailto:billing@example.test".into(),
            secret_key: String::new(),
            timeout: Duration::from_secs(5),
        });
        assert!(err.is_err());
    }

    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        path: String,
        query: String,
        headers: warp::http::HeaderMap,
        body: String,
    }

    impl Recorded {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }
    }

    /// Local stand-in for the vendor API that records every request.
    async fn stub_vendor() -> (StripePlatform, std::sync::Arc<std::sync::Mutex<Vec<Recorded>>>) {
        use warp::Filter;

        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::<Recorded>::new()));
        let recorder = log.clone();
        let routes = warp::method()
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .map(
                move |method: warp::http::Method,
                      path: warp::path::FullPath,
                      query: String,
                      headers: warp::http::HeaderMap,
                      body: warp::hyper::body::Bytes| {
                    let request = Recorded {
                        method: method.to_string(),
                        path: path.as_str().to_string(),
                        query,
                        headers,
                        body: String::from_utf8_lossy(&body).into_owned(),
                    };
                    let (status, reply) = match (request.method.as_str(), request.path.as_str()) {
                        ("GET", "/v1/customers") => (
                            warp::http::StatusCode::OK,
                            serde_json::json!({
                                "data": [{ "id": "cus_1", "email": null, "metadata": { "user_id": "u1" } }],
                                "has_more": true
                            }),
                        ),
                        ("POST", "/v1/customers") => (
                            warp::http::StatusCode::OK,
                            serde_json::json!({ "id": "cus_2", "email": null, "metadata": { "user_id": "u1" } }),
                        ),
                        ("POST", "/v1/payouts") => (
                            warp::http::StatusCode::OK,
                            serde_json::json!({
                                "id": "po_1", "amount": 500, "currency": "usd",
                                "status": "pending", "arrival_date": 1760000000
                            }),
                        ),
                        ("POST", "/v1/transfers") => (
                            warp::http::StatusCode::BAD_REQUEST,
                            serde_json::json!({ "error": {
                                "type": "invalid_request_error",
                                "code": "balance_insufficient",
                                "message": "You have insufficient available funds in your Stripe account."
                            }}),
                        ),
                        _ => (
                            warp::http::StatusCode::NOT_FOUND,
                            serde_json::json!({ "error": {
                                "type": "invalid_request_error",
                                "message": "Unrecognized request URL"
                            }}),
                        ),
                    };
                    recorder.lock().unwrap().push(request);
                    warp::reply::with_status(warp::reply::json(&reply), status)
                },
            );

        let (address, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (platform(&format!("http://{}", address)), log)
    }

    fn usd(amount: i64) -> (Amount, Currency) {
        (Amount::new(amount).unwrap(), Currency::parse("usd").unwrap())
    }

    #[tokio::test]
    async fn posts_are_form_encoded_authenticated_and_idempotent() {
        let (platform, log) = stub_vendor().await;

        let created = platform
            .create_customer(NewCustomer {
                user_id: UserId::parse("u1").unwrap(),
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, CustomerId("cus_2".into()));

        let (amount, currency) = usd(500);
        let payout = platform
            .create_payout(NewPayout {
                amount,
                currency,
                account: Some(AccountId("acct_9".into())),
            })
            .await
            .unwrap();
        assert_eq!(payout.arrival_date, Some(1760000000));

        let log = log.lock().unwrap().clone();
        assert_eq!(log.len(), 2);

        let customer = &log[0];
        assert_eq!((customer.method.as_str(), customer.path.as_str()), ("POST", "/v1/customers"));
        assert_eq!(customer.header("authorization"), Some("Bearer sk_test_123"));
        assert_eq!(
            customer.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(customer.body, "metadata%5Buser_id%5D=u1");
        assert!(customer.header("stripe-account").is_none());

        let payout = &log[1];
        assert_eq!(payout.path, "/v1/payouts");
        assert_eq!(payout.header("stripe-account"), Some("acct_9"));
        assert_eq!(payout.body, "amount=500&currency=usd");

        let first_key = customer.header("idempotency-key").unwrap();
        let second_key = payout.header("idempotency-key").unwrap();
        assert!(!first_key.is_empty());
        assert_ne!(first_key, second_key);
    }

    #[tokio::test]
    async fn directory_pages_are_plain_gets() {
        let (platform, log) = stub_vendor().await;

        let page = platform
            .list_customers(PageRequest {
                limit: 100,
                starting_after: Some(CustomerId("cus_0".into())),
            })
            .await
            .unwrap();
        assert!(page.has_more);
        assert!(page.data[0].belongs_to(&UserId::parse("u1").unwrap()));

        let log = log.lock().unwrap().clone();
        assert_eq!(log[0].method, "GET");
        assert_eq!(log[0].query, "limit=100&starting_after=cus_0");
        assert!(log[0].header("idempotency-key").is_none());
        assert_eq!(log[0].header("authorization"), Some("Bearer sk_test_123"));
    }

    #[tokio::test]
    async fn error_replies_map_to_platform_errors() {
        let (platform, _log) = stub_vendor().await;

        let (amount, currency) = usd(5000);
        let err = platform
            .create_transfer(NewTransfer {
                amount,
                currency,
                destination: AccountId("acct_9".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::BalanceInsufficient { .. }));

        let err = platform
            .retrieve_account(&AccountId("acct_missing".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }
}
