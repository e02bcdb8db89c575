mod account;
mod customer;
mod money;
mod page;
mod payment;
mod transfer;
mod user;

pub use account::*;
pub use customer::*;
pub use money::*;
pub use page::*;
pub use payment::*;
pub use transfer::*;
pub use user::*;
