use std::time::Duration;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub max_in_flight: usize,
}

impl Config {
    /// Reads `BOOKCASE_*` variables; CLI flags, when given, win over the environment.
    pub fn from_env(
        base_url_override: Option<&str>,
        timeout_secs_override: Option<u64>,
    ) -> anyhow::Result<Self> {
        let base_url = match base_url_override {
            Some(raw) => parse_base_url(raw).context("invalid --base-url")?,
            None => match std::env::var("BOOKCASE_BASE_URL") {
                Ok(raw) => parse_base_url(&raw)
                    .with_context(|| format!("invalid BOOKCASE_BASE_URL={raw:?}"))?,
                Err(_) => parse_base_url(DEFAULT_BASE_URL)?,
            },
        };

        let timeout_secs = match timeout_secs_override {
            Some(0) => anyhow::bail!("invalid --timeout-secs: timeout must be > 0"),
            Some(secs) => secs,
            None => match std::env::var("BOOKCASE_TIMEOUT_SECS") {
                Ok(raw) => parse_timeout_secs(&raw)
                    .with_context(|| format!("invalid BOOKCASE_TIMEOUT_SECS={raw:?}"))?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            },
        };

        let max_in_flight = match std::env::var("BOOKCASE_MAX_IN_FLIGHT") {
            Ok(raw) => parse_max_in_flight(&raw)
                .with_context(|| format!("invalid BOOKCASE_MAX_IN_FLIGHT={raw:?}"))?,
            Err(_) => DEFAULT_MAX_IN_FLIGHT,
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_in_flight,
        })
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("base url is empty");
    }
    let url = Url::parse(raw).with_context(|| format!("parse base url: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("base url must be http/https: {url}");
    }
    if url.host_str().is_none() {
        anyhow::bail!("base url must have host: {url}");
    }
    Ok(url)
}

pub fn parse_timeout_secs(raw: &str) -> anyhow::Result<u64> {
    let secs: u64 = raw.trim().parse().context("parse timeout seconds")?;
    if secs == 0 {
        anyhow::bail!("timeout must be > 0");
    }
    Ok(secs)
}

pub fn parse_max_in_flight(raw: &str) -> anyhow::Result<usize> {
    let value: usize = raw.trim().parse().context("parse max in-flight requests")?;
    Ok(value.max(1))
}
