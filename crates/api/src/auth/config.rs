use crate::config::{env_bool, env_parse, env_required, ConfigError};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: u64,
    pub cookie_secure: bool,
    pub password_min_length: usize,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: env_required("JWT_SECRET")?,
            session_ttl_minutes: env_parse("SESSION_TTL_MINUTES", 24 * 60),
            cookie_secure: env_bool("COOKIE_SECURE", false),
            password_min_length: env_parse("PASSWORD_MIN_LENGTH", 8),
        })
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_minutes.saturating_mul(60)
    }
}
