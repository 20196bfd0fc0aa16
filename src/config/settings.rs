use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::env::{self, EnvKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be {requirement}")]
    OutOfRange {
        key: &'static str,
        requirement: &'static str,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub grpc_port: u16,
    pub http_port: u16,
    pub queue_capacity: usize,
    pub worker_count: usize,
    pub data_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub compress: bool,
    pub shutdown_grace_secs: u64,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self {
            grpc_port: env::get_parsed(EnvKey::GrpcPort, 50051)?,
            http_port: env::get_parsed(EnvKey::HttpPort, 8080)?,
            queue_capacity: env::get_parsed(EnvKey::QueueCapacity, 32)?,
            worker_count: env::get_parsed(EnvKey::WorkerCount, 2)?,
            data_dir: PathBuf::from(env::get_or(EnvKey::DataDir, "./data")),
            ffmpeg_path: PathBuf::from(env::get_or(EnvKey::FfmpegPath, "ffmpeg")),
            compress: env::get_parsed(EnvKey::CompressEnabled, true)?,
            shutdown_grace_secs: env::get_parsed(EnvKey::ShutdownGraceSecs, 5)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grpc_port == 0 {
            return Err(ConfigError::OutOfRange {
                key: EnvKey::GrpcPort.as_str(),
                requirement: "between 1 and 65535",
            });
        }
        if self.http_port == 0 {
            return Err(ConfigError::OutOfRange {
                key: EnvKey::HttpPort.as_str(),
                requirement: "between 1 and 65535",
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                key: EnvKey::QueueCapacity.as_str(),
                requirement: "positive",
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::OutOfRange {
                key: EnvKey::WorkerCount.as_str(),
                requirement: "positive",
            });
        }
        Ok(())
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grpc_port: 50051,
            http_port: 8080,
            queue_capacity: 32,
            worker_count: 2,
            data_dir: PathBuf::from("./data"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            compress: true,
            shutdown_grace_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_capacity_and_workers() {
        let config = AppConfig {
            queue_capacity: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { key: "QUEUE_CAPACITY", .. })
        ));

        let config = AppConfig {
            worker_count: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { key: "WORKER_COUNT", .. })
        ));
    }

    #[test]
    fn rejects_port_zero() {
        let config = AppConfig {
            http_port: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
