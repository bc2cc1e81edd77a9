use serde::Deserialize;

/// Layered configuration: a bundled default file (`config/default.toml`, if
/// present next to the binary) overridden by `LOANCORE_*` environment
/// variables. The four values the process cannot start without are
/// `datastore_url`, `cache_capacity`/`cache_ttl_secs` (the in-process cache
/// has no connection string of its own — it is not a separate service),
/// and the two token secrets.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub datastore_url: String,

    /// Deployment mode gates the `Secure` cookie attribute: cookies are only
    /// marked secure when this is `"production"`.
    #[serde(default = "default_deployment_mode")]
    pub deployment_mode: String,

    pub access_token_secret: String,
    pub refresh_token_secret: String,

    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: i64,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit_attempts: u32,
    #[serde(default = "default_login_rate_limit_window_secs")]
    pub login_rate_limit_window_secs: u64,

    /// How often the background worker polls for loans missing a schedule.
    #[serde(default = "default_schedule_poll_interval_secs")]
    pub schedule_poll_interval_secs: u64,
    #[serde(default = "default_schedule_batch_size")]
    pub schedule_batch_size: u32,

    /// Origins allowed to make cross-origin requests in production. Empty
    /// by default, which means no browser origin is trusted until this is
    /// set — fail-closed rather than the permissive default the `Cors`
    /// builder would otherwise apply.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.deployment_mode.eq_ignore_ascii_case("production")
    }

    /// Loads `config/default.toml` (if present) and then `LOANCORE_*`
    /// environment variables, the latter taking precedence. `.env` is read
    /// first via `dotenvy` so local development needs no shell exports.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("LOANCORE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn default_deployment_mode() -> String {
    "development".to_string()
}
fn default_access_token_minutes() -> i64 {
    15
}
fn default_refresh_token_days() -> i64 {
    7
}
fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}
fn default_bind_port() -> u16 {
    8080
}
fn default_cache_capacity() -> u64 {
    10_000
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_login_rate_limit() -> u32 {
    5
}
fn default_login_rate_limit_window_secs() -> u64 {
    300
}
fn default_schedule_poll_interval_secs() -> u64 {
    30
}
fn default_schedule_batch_size() -> u32 {
    50
}
