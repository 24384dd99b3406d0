use anyhow::Context;

/// Argon2 work factor.
#[derive(Debug, Clone)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub hash: HashConfig,
    pub host: String,
    pub port: u16,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("PASSWORD_HASH_ITERATIONS", defaults.iterations),
            parallelism: env_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism),
        };
        Ok(Self {
            database_url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5),
            hash,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
        })
    }
}
