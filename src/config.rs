// src/config.rs

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::normalize::AlignmentPolicy;

pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_current_world_boxing_champions";

const ENV_PREFIX: &str = "BELT";

/// Runtime settings, read from `BELT_*` environment variables.
///
/// `store_uri` has no default: a missing `BELT_STORE_URI` fails startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store_uri: String,
    pub source_url: String,
    pub fetch_timeout_secs: u64,
    pub run_deadline_secs: u64,
    pub alignment: AlignmentPolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Builds settings from any `config` source on top of the defaults.
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .set_default("source_url", DEFAULT_SOURCE_URL)?
            .set_default("fetch_timeout_secs", 30)?
            .set_default("run_deadline_secs", 120)?
            .set_default("alignment", "truncate")?
            .add_source(source)
            .build()
            .context("building configuration")?
            .try_deserialize::<Settings>()
            .context("BELT_STORE_URI must be set (and other BELT_* values must be valid)")?;

        if settings.store_uri.trim().is_empty() {
            anyhow::bail!("BELT_STORE_URI is empty");
        }
        Ok(settings)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }
}
