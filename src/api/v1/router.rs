use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

const MAX_JSON_BODY: u64 = 64 * 1024;
const MAX_WEBHOOK_BODY: u64 = 512 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let resolve_customer = warp::path!("customers" / "resolve")
        .and(warp::post())
        .and(json_body())
        .and(with(server.identity_service.clone()))
        .and_then(handler::resolve_customer);

    let create_account = warp::path!("accounts")
        .and(warp::post())
        .and(json_body())
        .and(with(server.account_service.clone()))
        .and_then(handler::create_account);

    let account_status = warp::path!("accounts" / String)
        .and(warp::get())
        .and(with(server.account_service.clone()))
        .and_then(handler::account_status);

    let create_account_link = warp::path!("account_links")
        .and(warp::post())
        .and(json_body())
        .and(with(server.account_service.clone()))
        .and_then(handler::create_account_link);

    let create_payment_intent = warp::path!("payment_intents")
        .and(warp::post())
        .and(json_body())
        .and(with(server.payment_service.clone()))
        .and_then(handler::create_payment_intent);

    let create_setup_intent = warp::path!("setup_intents")
        .and(warp::post())
        .and(json_body())
        .and(with(server.payment_service.clone()))
        .and_then(handler::create_setup_intent);

    let list_payment_methods = warp::path!("payment_methods")
        .and(warp::get())
        .and(warp::query::<handler::PaymentMethodsQuery>())
        .and(with(server.payment_service.clone()))
        .and_then(handler::list_payment_methods);

    let delete_payment_method = warp::path!("payment_methods" / String)
        .and(warp::delete())
        .and(with(server.payment_service.clone()))
        .and_then(handler::delete_payment_method);

    let create_transfer = warp::path!("transfers")
        .and(warp::post())
        .and(json_body())
        .and(with(server.transfer_service.clone()))
        .and_then(handler::create_transfer);

    let create_payout = warp::path!("payouts")
        .and(warp::post())
        .and(json_body())
        .and(with(server.transfer_service.clone()))
        .and_then(handler::create_payout);

    let webhook = warp::path!("webhooks")
        .and(warp::post())
        .and(warp::header::optional::<String>("stripe-signature"))
        .and(warp::body::content_length_limit(MAX_WEBHOOK_BODY))
        .and(warp::body::bytes())
        .and(with(server.webhook_service.clone()))
        .and_then(handler::receive_webhook);

    resolve_customer
        .or(create_account)
        .or(account_status)
        .or(create_account_link)
        .or(create_payment_intent)
        .or(create_setup_intent)
        .or(list_payment_methods)
        .or(delete_payment_method)
        .or(create_transfer)
        .or(create_payout)
        .or(webhook)
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_JSON_BODY).and(warp::body::json())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
