mod identity_store_redis;

pub use identity_store_redis::*;
