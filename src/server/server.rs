use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::infra_stripe::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

pub struct ServerOptions {
    pub scan_limits: ScanLimits,
    pub onboarding: OnboardingUrls,
    pub webhook_secret: Option<String>,
}

pub struct Server {
    pub identity_service: Arc<dyn IdentityService>,
    pub account_service: Arc<dyn AccountService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub transfer_service: Arc<dyn TransferService>,
    pub webhook_service: Arc<dyn WebhookService>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let platform: Arc<dyn PaymentPlatform> = match settings.platform.backend.as_str() {
            "fake" => {
                warn!("using the in-memory fake payments platform");
                Arc::new(FakePaymentPlatform::new())
            }
            "stripe" => {
                let secret_key = std::env::var(&settings.platform.secret_key_env)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        anyhow!(
                            "{} must be set for the stripe backend",
                            settings.platform.secret_key_env
                        )
                    })?;
                Arc::new(StripePlatform::new(StripeConfig {
                    api_base: settings.platform.api_base.clone(),
                    secret_key,
                    timeout: Duration::from_secs(settings.platform.timeout_secs),
                })?)
            }
            other => return Err(anyhow!("Unknown platform backend: {}", other)),
        };

        let identity_store: Arc<dyn IdentityStore> = match settings.identity.backend.as_str() {
            "memory" => Arc::new(MemoryIdentityStore::new()),
            "redis" => {
                let dsn = settings
                    .identity
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("identity.redis_dsn is required for the redis backend"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisIdentityStore::new(
                    redis_manager,
                    settings.identity.key_prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown identity backend: {}", other)),
        };

        let webhook_secret = std::env::var(&settings.platform.webhook_secret_env)
            .ok()
            .filter(|secret| !secret.is_empty());
        if webhook_secret.is_none() {
            info!(
                "{} not set, webhook endpoint disabled",
                settings.platform.webhook_secret_env
            );
        }

        let options = ServerOptions {
            scan_limits: ScanLimits {
                page_size: settings.identity.page_size,
                max_pages: settings.identity.max_pages,
            },
            onboarding: OnboardingUrls {
                refresh_url: settings.onboarding.refresh_url.clone(),
                return_url: settings.onboarding.return_url.clone(),
            },
            webhook_secret,
        };
        let server = Self::from_parts(platform, identity_store, options);

        info!(
            platform = %settings.platform.backend,
            identity = %settings.identity.backend,
            "server started"
        );
        Ok(server)
    }

    /// Wires the services over already constructed backends.
    pub fn from_parts(
        platform: Arc<dyn PaymentPlatform>,
        identity_store: Arc<dyn IdentityStore>,
        options: ServerOptions,
    ) -> Self {
        let identity_service: Arc<dyn IdentityService> = Arc::new(RealIdentityService::new(
            identity_store,
            platform.clone(),
            options.scan_limits,
        ));
        let account_service: Arc<dyn AccountService> = Arc::new(RealAccountService::new(
            platform.clone(),
            options.onboarding,
        ));
        let payment_service: Arc<dyn PaymentService> = Arc::new(RealPaymentService::new(
            identity_service.clone(),
            platform.clone(),
        ));
        let transfer_service: Arc<dyn TransferService> =
            Arc::new(RealTransferService::new(platform));
        let webhook_service: Arc<dyn WebhookService> =
            Arc::new(SignedWebhookService::new(options.webhook_secret));

        Self {
            identity_service,
            account_service,
            payment_service,
            transfer_service,
            webhook_service,
        }
    }
}
