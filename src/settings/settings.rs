use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub platform: Platform,
    #[serde(default)]
    pub identity: Identity,
    pub onboarding: Onboarding,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Platform {
    pub backend: String, // "fake" or "stripe"
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,
    #[serde(default = "default_webhook_secret_env")]
    pub webhook_secret_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    #[serde(default = "default_identity_backend")]
    pub backend: String, // "memory" or "redis"
    pub redis_dsn: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_page_size")]
    pub page_size: u8,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            backend: default_identity_backend(),
            redis_dsn: None,
            key_prefix: default_key_prefix(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Onboarding {
    pub refresh_url: String,
    pub return_url: String,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_secret_key_env() -> String {
    "STRIPE_SECRET_KEY".to_string()
}

fn default_webhook_secret_env() -> String {
    "STRIPE_WEBHOOK_SECRET".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_identity_backend() -> String {
    "memory".to_string()
}

fn default_key_prefix() -> String {
    "identity".to_string()
}

fn default_page_size() -> u8 {
    100
}

fn default_max_pages() -> usize {
    10
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.identity.page_size == 0 || self.identity.page_size > 100 {
            return Err(anyhow!(
                "identity.page_size must be within 1..=100, got {}",
                self.identity.page_size
            ));
        }
        if self.identity.max_pages == 0 {
            return Err(anyhow!("identity.max_pages must be at least 1"));
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            return Err(anyhow!("http.cert_path and http.key_path must be set together"));
        }
        Ok(())
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "PAYBRIDGE";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<Settings> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    const MINIMAL: &str = r#"
        [http]
        address = "127.0.0.1:3000"

        [log]
        filter = "info"

        [platform]
        backend = "fake"

        [onboarding]
        refresh_url = "https://app.example.test/reauth"
        return_url = "https://app.example.test/return"
    "#;

    #[test]
    fn defaults_fill_optional_sections() {
        let settings = from_toml(MINIMAL).unwrap();
        assert_eq!(settings.platform.api_base, "https://api.stripe.com");
        assert_eq!(settings.platform.secret_key_env, "STRIPE_SECRET_KEY");
        assert_eq!(settings.identity.backend, "memory");
        assert_eq!(settings.identity.page_size, 100);
        assert_eq!(settings.identity.max_pages, 10);
        assert!(settings.http.cert_path.is_none());
    }

    #[test]
    fn rejects_oversized_pages() {
        let toml = format!("{}\n[identity]\npage_size = 250\n", MINIMAL);
        assert!(from_toml(&toml).is_err());
    }

    #[test]
    fn rejects_half_configured_tls() {
        let toml = MINIMAL.replace(
            "address = \"127.0.0.1:3000\"",
            "address = \"127.0.0.1:3000\"\ncert_path = \"cert.pem\"",
        );
        assert!(from_toml(&toml).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist")).is_err());
    }
}
