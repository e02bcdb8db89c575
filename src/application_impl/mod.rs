mod account_service_impl;
mod customer_directory;
mod identity_service_impl;
mod payment_service_impl;
mod transfer_service_impl;
mod webhook_service_impl;

pub use account_service_impl::*;
pub use customer_directory::*;
pub use identity_service_impl::*;
pub use payment_service_impl::*;
pub use transfer_service_impl::*;
pub use webhook_service_impl::*;
