//! Credential resolution for declared instances.
//!
//! Inline `base_url`/`api_key` values win (they usually arrive through
//! `${VAR}` interpolation anyway); otherwise the conventional
//! `SONARR_<INSTANCE>_URL` / `SONARR_<INSTANCE>_API_KEY` variables are
//! consulted, with the instance name uppercased and dashes mapped to
//! underscores.

use anyhow::{Result, bail};
use arrkit::InstanceConfig;
use arrkit::import::env_var_name;

#[derive(Debug)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
}

pub fn resolve(instance: &InstanceConfig) -> Result<Credentials> {
    let env_name = env_var_name(&instance.name);

    let base_url = match &instance.base_url {
        Some(url) if !url.is_empty() => url.clone(),
        _ => require_env(&format!("SONARR_{env_name}_URL"), &instance.name)?,
    };
    let api_key = match &instance.api_key {
        Some(key) if !key.is_empty() => key.clone(),
        _ => require_env(&format!("SONARR_{env_name}_API_KEY"), &instance.name)?,
    };

    Ok(Credentials { base_url, api_key })
}

fn require_env(key: &str, instance: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("no credentials for instance '{instance}': set {key} or declare it inline"),
    }
}
