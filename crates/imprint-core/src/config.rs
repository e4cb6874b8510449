//! Configuration module
//!
//! Environment-based configuration for the API binary and background
//! services: server, database, artifact storage, retention, rasterization,
//! admin credentials, and the notification gateway.

use std::env;
use std::path::PathBuf;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 25;
const STAGED_TTL_DAYS: u64 = 30;
const SWEEP_INTERVAL_SECS: u64 = 3600;
const RASTER_MAX_PIXELS: u32 = 2048;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Root directory for the artifact store (temp/, orders/, proofs/ live below it).
    pub storage_root: PathBuf,
    pub max_upload_size_bytes: usize,
    /// Staged uploads older than this are reclaimed by the sweeper.
    pub staged_ttl_days: u64,
    pub sweep_interval_secs: u64,
    /// Longest rendered edge in pixels for page rasterization.
    pub raster_max_pixels: u32,
    pub admin_user: String,
    pub admin_pass: String,
    // Notification gateway (optional; notifier is disabled when unset)
    pub notify_gateway_url: Option<String>,
    pub notify_token: Option<String>,
    pub notify_target: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_root: env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            staged_ttl_days: env::var("STAGED_TTL_DAYS")
                .unwrap_or_else(|_| STAGED_TTL_DAYS.to_string())
                .parse()
                .unwrap_or(STAGED_TTL_DAYS),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| SWEEP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(SWEEP_INTERVAL_SECS),
            raster_max_pixels: env::var("RASTER_MAX_PIXELS")
                .unwrap_or_else(|_| RASTER_MAX_PIXELS.to_string())
                .parse()
                .unwrap_or(RASTER_MAX_PIXELS),
            admin_user: env::var("ADMIN_USER")
                .map_err(|_| anyhow::anyhow!("ADMIN_USER must be set for the admin surface"))?,
            admin_pass: env::var("ADMIN_PASS")
                .map_err(|_| anyhow::anyhow!("ADMIN_PASS must be set for the admin surface"))?,
            notify_gateway_url: env::var("NOTIFY_GATEWAY_URL").ok(),
            notify_token: env::var("NOTIFY_TOKEN").ok(),
            notify_target: env::var("NOTIFY_TARGET").ok(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
