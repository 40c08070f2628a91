use anyhow::Context;
use serde::Deserialize;
use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtSettings,
}

/// Parameters used to verify viewer bearer tokens. Tokens are issued elsewhere.
#[derive(Clone, Debug, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl AppConfig {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)
                .with_context(|| format!("{} must be set", EnvKey::DatabaseUrl.as_str()))?,
            database_max_connections: env::get_parsed(EnvKey::DatabaseMaxConnections, 20),
            jwt: JwtSettings {
                secret: env::get(EnvKey::JwtSecret)
                    .with_context(|| format!("{} must be set", EnvKey::JwtSecret.as_str()))?,
                issuer: env::get_optional(EnvKey::JwtIssuer),
                audience: env::get_optional(EnvKey::JwtAudience),
            },
        })
    }
}
