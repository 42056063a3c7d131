use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::leaderboard::ScoringRule;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// Unset keeps idle connections open indefinitely.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_lifetime_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity service that issues tokens.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    pub storage_dir: PathBuf,
    /// Maximum submission video size in bytes.
    pub max_video_size: u64,
    /// Maximum uploaded image size in bytes.
    pub max_image_size: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./uploads"),
            max_video_size: 50 * 1024 * 1024,
            max_image_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    /// Active scoring rule. `wins` is canonical; `points` is the legacy rule.
    pub scoring: ScoringRule,
    pub default_limit: u64,
    /// Avatar URL for users without a profile image; `{id}` is replaced by the user ID.
    pub avatar_placeholder: String,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRule::Wins,
            default_limit: 50,
            avatar_placeholder: "https://i.pravatar.cc/150?u={id}".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 5)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("media.storage_dir", "./uploads")?
            .set_default("media.max_video_size", 50 * 1024 * 1024)?
            .set_default("media.max_image_size", 10 * 1024 * 1024)?
            .set_default("leaderboard.scoring", "wins")?
            .set_default("leaderboard.default_limit", 50)?
            .set_default(
                "leaderboard.avatar_placeholder",
                "https://i.pravatar.cc/150?u={id}",
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RUSH__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("RUSH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
