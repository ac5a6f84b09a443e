//! Service configuration loaded from environment variables.
//!
//! Every value has a default that is fine for local development. The signing
//! secret default is not fine anywhere else; `main` warns when it is in use.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use thiserror::Error;

pub const DEV_JWT_SECRET: &str = "dev-secret-change";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct TokenConfig {
    pub secret: SecretString,
    pub algorithm: Algorithm,
    pub expires_minutes: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("expires_minutes", &self.expires_minutes)
            .finish()
    }
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub token: TokenConfig,
    pub hashing: HashingConfig,
    pub uploads_dir: PathBuf,
    /// Used to build upload URLs; falls back to the request `Host` header.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let expires_minutes: i64 = parse_or("JWT_EXPIRES_MINUTES", &lookup, 60)?;
        if expires_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_EXPIRES_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_or("ARGON2_MEMORY_KIB", &lookup, defaults.memory_kib)?,
            iterations: parse_or("ARGON2_ITERATIONS", &lookup, defaults.iterations)?,
            parallelism: parse_or("ARGON2_PARALLELISM", &lookup, defaults.parallelism)?,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://shop.db?mode=rwc".to_string()),
            host: parse_or("HOST", &lookup, IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or("PORT", &lookup, 3000)?,
            token: TokenConfig {
                secret: SecretString::from(
                    lookup("JWT_SECRET_KEY").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
                ),
                algorithm,
                expires_minutes,
            },
            hashing,
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", &lookup, 5 * 1024 * 1024)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Only the HMAC family is accepted: the secret is a shared symmetric key.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(raw.trim().to_ascii_uppercase().as_str())
        .map_err(|e| ConfigError::InvalidEnvVar("JWT_ALGORITHM".to_string(), e.to_string()))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::InvalidEnvVar(
            "JWT_ALGORITHM".to_string(),
            format!("{other:?} is not a symmetric algorithm"),
        )),
    }
}
