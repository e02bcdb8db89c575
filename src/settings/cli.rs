use super::Parser;

/// Payments gateway for the mobile app.
#[derive(Parser, Debug)]
#[command(name = "paybridge", version)]
pub struct Cli {
    /// Path to a TOML settings file. Defaults to `settings/dev.toml` in debug builds.
    #[arg(long)]
    pub settings: Option<String>,
}
