#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub site_url: String,
    pub log_level: String,
    /// Base URL of the Supabase project, e.g. `https://abc.supabase.co`.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub request_timeout_secs: u64,
    /// Additional attempts after the first failure for transient RPC errors.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Upper bound on waiting for a position fix before falling back to the
    /// default coordinate.
    pub locate_timeout_secs: u64,
    /// Optional IP geolocation endpoint used when no fixed position is given.
    pub geoip_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("site_url", &self.site_url)
            .field("log_level", &self.log_level)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("locate_timeout_secs", &self.locate_timeout_secs)
            .field("geoip_url", &self.geoip_url)
            .finish()
    }
}
