use anyhow::{Context, Result};
use tracing::info;

/// Environment-driven configuration. `load()` reads `.env.<APP_ENV>`
/// when present, then the plain `.env`, then the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub docstore: DocStoreConfig,

    pub auth: AuthConfig,

    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL. `DATABASE_URL` overrides the assembled
    /// `PG_*` form, which is also how the tests select SQLite.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct DocStoreConfig {
    pub uri: String,

    pub database: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 key for bearer tokens.
    pub jwt_secret: String,

    /// Key material for signed session cookies, 32 bytes minimum.
    pub session_secret: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        let app_env = env_or("APP_ENV", "development");
        if dotenvy::from_filename(format!(".env.{app_env}")).is_ok() {
            info!("Loaded environment from .env.{app_env}");
        } else {
            dotenvy::dotenv().ok();
        }

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                env_or("PG_USER", "postgres"),
                env_or("PG_PASS", "postgres"),
                env_or("PG_HOST", "localhost"),
                env_or("PG_PORT", "5432"),
                env_or("PG_DB", "cinelog"),
            )
        });

        let port = env_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let cors_allowed_origins = env_or("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            server: ServerConfig {
                port,
                cors_allowed_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 10,
                min_connections: 1,
            },
            docstore: DocStoreConfig {
                uri: env_or("MONGO_URI", "mongodb://localhost:27017"),
                database: env_or("MONGO_DB", "cinelog"),
            },
            auth: AuthConfig {
                jwt_secret: env_or("JWT_SECRET_KEY", ""),
                session_secret: env_or("SESSION_SECRET", ""),
            },
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET_KEY must be set");
        }

        if self.auth.session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 bytes");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        Ok(())
    }
}
