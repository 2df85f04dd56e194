use crate::credential::Credential;
use crate::environment::Environment;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub key: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            environment: lookup("MOIP_ENVIRONMENT")
                .unwrap_or_else(|| Environment::default().key().to_string())
                .parse::<Environment>()
                .map_err(|e| anyhow::anyhow!("MOIP_ENVIRONMENT is invalid: {}", e))?,
            key: lookup("MOIP_KEY")
                .ok_or_else(|| anyhow::anyhow!("MOIP_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("MOIP_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            token: lookup("MOIP_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("MOIP_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("MOIP_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            timeout_secs: lookup("MOIP_TIMEOUT_SECS")
                .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MOIP_TIMEOUT_SECS must be a whole number of seconds"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Moip environment: {} ({})",
            config.environment.display_name(),
            config.environment.base_url()
        );
        if !config.credential().is_well_formed() {
            tracing::warn!("MOIP_KEY/MOIP_TOKEN do not have the expected lengths (40/32)");
        }
        tracing::debug!("Request timeout: {}s", config.timeout_secs);

        Ok(config)
    }

    pub fn credential(&self) -> Credential {
        Credential::new(&self.key, &self.token)
    }
}
