mod identity_store_memory;
mod payment_platform_fake;

pub use identity_store_memory::*;
pub use payment_platform_fake::*;
