mod client;
mod form;
mod wire;

pub use client::*;
