mod account_service;
mod error;
mod identity_service;
mod payment_service;
mod transfer_service;
mod webhook_service;

pub use account_service::*;
pub use error::*;
pub use identity_service::*;
pub use payment_service::*;
pub use transfer_service::*;
pub use webhook_service::*;
