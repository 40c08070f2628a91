use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    DatabaseMaxConnections,
    JwtSecret,
    JwtIssuer,
    JwtAudience,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::DatabaseMaxConnections => "DATABASE_MAX_CONNECTIONS",
            EnvKey::JwtSecret => "JWT_SECRET",
            EnvKey::JwtIssuer => "JWT_ISSUER",
            EnvKey::JwtAudience => "JWT_AUDIENCE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_optional(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
