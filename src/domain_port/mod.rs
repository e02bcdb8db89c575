mod identity_store;
mod payment_platform;

pub use identity_store::*;
pub use payment_platform::*;
