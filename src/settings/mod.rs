//! Settings come from a TOML file overlaid with `PAYBRIDGE__<SECTION>__<KEY>`
//! environment variables. Secrets are never read from the file.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
