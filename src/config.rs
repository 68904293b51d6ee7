//! Deployment configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | 3000 |
//! | `RECOMMENDER_STRATEGY` | `local` (`local` or `remote`) |
//! | `RECOMMENDER_ENDPOINT` | required when remote |
//! | `RECOMMENDER_TIMEOUT_SECS` | 10 |
//! | `RECOMMENDER_WIRE_FIELDS` | identity mapping, e.g. `temperature=temp` |
//! | `RECOMMENDER_SEED` | unseeded |
//! | `FORM_VARIANT` | `nutrients` (`nutrients` or `soil_type`) |
//! | `SESSION_TTL_SECS` | 1800 |
//! | `BACKEND_URL` / `BACKEND_KEY` | unset (both or neither) |

use crate::provider::DEFAULT_TIMEOUT;
use crate::sample::FormVariant;
use crate::wire::WireFieldMap;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    Local {
        seed: Option<u64>,
    },
    Remote {
        endpoint: String,
        timeout: Duration,
        fields: WireFieldMap,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub strategy: StrategyConfig,
    pub form_variant: FormVariant,
    pub session_ttl: Duration,
    pub backend: Option<BackendConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            strategy: StrategyConfig::Local { seed: None },
            form_variant: FormVariant::Nutrients,
            session_ttl: DEFAULT_SESSION_TTL,
            backend: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_var(&get, "PORT")?.unwrap_or(DEFAULT_PORT);

        let strategy = match get("RECOMMENDER_STRATEGY").as_deref().unwrap_or("local") {
            "local" => StrategyConfig::Local {
                seed: parse_var(&get, "RECOMMENDER_SEED")?,
            },
            "remote" => {
                let endpoint = get("RECOMMENDER_ENDPOINT")
                    .context("RECOMMENDER_ENDPOINT is required for the remote strategy")?;
                let timeout = parse_var::<u64, _>(&get, "RECOMMENDER_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TIMEOUT);
                if timeout.is_zero() {
                    anyhow::bail!("RECOMMENDER_TIMEOUT_SECS must be greater than 0");
                }
                let mapping = get("RECOMMENDER_WIRE_FIELDS").unwrap_or_default();
                let fields =
                    WireFieldMap::parse(&mapping).context("Invalid RECOMMENDER_WIRE_FIELDS")?;
                StrategyConfig::Remote {
                    endpoint,
                    timeout,
                    fields,
                }
            }
            other => anyhow::bail!(
                "Unknown RECOMMENDER_STRATEGY '{}' (expected local or remote)",
                other
            ),
        };

        let form_variant = match get("FORM_VARIANT") {
            Some(v) => v.parse::<FormVariant>().map_err(anyhow::Error::msg)?,
            None => FormVariant::default(),
        };

        let session_ttl = parse_var::<u64, _>(&get, "SESSION_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);

        let backend = match (get("BACKEND_URL"), get("BACKEND_KEY")) {
            (Some(url), Some(key)) => Some(BackendConfig { url, key }),
            (None, None) => None,
            _ => anyhow::bail!("BACKEND_URL and BACKEND_KEY must be set together"),
        };

        Ok(Self {
            port,
            strategy,
            form_variant,
            session_ttl,
            backend,
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, v, e))
        })
        .transpose()
}
