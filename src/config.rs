use crate::{
    data::retry::RetryPolicy,
    error::{BadEnvVarSnafu, ParseEnvNumberSnafu, ParsePortSnafu, RosterResult},
};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{sync::Arc, time::Duration};

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    retry_policy: RetryPolicy,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            retry_policy: retry_policy_from_env()?,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}

/// Every knob is optional, missing ones fall back to [`RetryPolicy::default`].
fn retry_policy_from_env() -> RosterResult<RetryPolicy> {
    let optional_number = |name: &'static str| -> RosterResult<Option<u64>> {
        var(name)
            .ok()
            .map(|value| value.parse().context(ParseEnvNumberSnafu { name }))
            .transpose()
    };

    let default = RetryPolicy::default();
    let max_attempts = optional_number("STORE_MAX_ATTEMPTS")?
        .map_or(default.max_attempts, |n| u32::try_from(n).unwrap_or(u32::MAX));
    let base_delay =
        optional_number("STORE_BASE_DELAY_MS")?.map_or(default.base_delay, Duration::from_millis);
    let max_delay =
        optional_number("STORE_MAX_DELAY_MS")?.map_or(default.max_delay, Duration::from_millis);

    Ok(RetryPolicy::new(max_attempts, base_delay, max_delay))
}
