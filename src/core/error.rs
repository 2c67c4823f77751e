use thiserror::Error;

use crate::core::types::DeviceId;

#[derive(Error, Debug)]
pub enum GroupWalkError {
    #[error("Invalid group {group_id}: {reason}")]
    InvalidGroup { group_id: i64, reason: String },

    #[error("Device {0} spawned by more than one group")]
    DuplicateDevice(DeviceId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Map parse error: {0}")]
    MapParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GroupWalkError>;
