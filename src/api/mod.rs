pub mod v1;

use crate::server::Server;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use warp::Filter;

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub fn health() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse {
            status: "ok",
            service: SERVICE_NAME,
            timestamp: Utc::now(),
        })
    })
}

/// Every route the process serves, with rejections rendered as JSON errors.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server));

    health()
        .or(api_v1)
        .recover(v1::recover_error)
        .with(warp::trace::request())
}
