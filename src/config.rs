//! Configuration management for the handout server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Working directory for stored uploads, one subdirectory per token.
    pub dir: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_bytes: usize,
    /// Uploads older than this are swept even if never processed.
    pub ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_bytes: 16 * 1024 * 1024,
                ttl_minutes: 60,
            },
        }
    }
}

impl Config {
    /// Every setting has a default, so loading never fails; unparseable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            upload: UploadConfig {
                dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
                max_bytes: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(16)
                    * 1024
                    * 1024,
                ttl_minutes: env::var("UPLOAD_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(60),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_bytes, 16 * 1024 * 1024);
        assert_eq!(config.upload.dir, PathBuf::from("uploads"));
        assert_eq!(config.upload.ttl_minutes, 60);
    }
}
