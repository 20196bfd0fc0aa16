use std::env;
use std::str::FromStr;

use super::settings::ConfigError;

#[derive(Clone, Copy, Debug)]
pub enum EnvKey {
    GrpcPort,
    HttpPort,
    QueueCapacity,
    WorkerCount,
    DataDir,
    FfmpegPath,
    CompressEnabled,
    ShutdownGraceSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::GrpcPort => "GRPC_PORT",
            EnvKey::HttpPort => "HTTP_PORT",
            EnvKey::QueueCapacity => "QUEUE_CAPACITY",
            EnvKey::WorkerCount => "WORKER_COUNT",
            EnvKey::DataDir => "DATA_DIR",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::CompressEnabled => "COMPRESS_ENABLED",
            EnvKey::ShutdownGraceSecs => "SHUTDOWN_GRACE_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Parses the variable if it is set, falling back to `default` only when it is absent.
/// A value that is present but unparsable is reported instead of swallowed.
pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> Result<T, ConfigError> {
    match get(key) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            key: key.as_str(),
            value: val,
        }),
        Err(_) => Ok(default),
    }
}
