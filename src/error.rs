// src/error.rs
//! Типы ошибок крейта.
//!
//! Каждый слой возвращает свою ошибку: конфигурация, данные провинций,
//! опрос рельефа, хранилище и управление задачей.

use std::path::PathBuf;

use crate::job::{JobAction, JobStatus};
use crate::province::Coordinate;

/// Ошибка загрузки или проверки конфигурации
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Нарушение инварианта провинции
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProvinceError {
    #[error("province {0} has no coordinates")]
    NoCoordinates(u32),
}

/// Ошибка одного запроса биома. Восстановимая: теряется только текущая провинция.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("terrain backend unavailable: {0}")]
    Unavailable(String),

    #[error("unknown world '{0}'")]
    UnknownWorld(String),
}

/// Ошибка записи или чтения провинции
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("province store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed province record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Отказ контроллера выполнить запрос
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("land validation job is already running ({0})")]
    AlreadyRunning(JobStatus),

    #[error("cannot {action} land validation job while it is {status}")]
    InvalidTransition { action: JobAction, status: JobStatus },

    #[error("failed to spawn land validation worker: {0}")]
    Spawn(String),
}

/// Почему классификация провинции не дала результата
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("biome sample failed: {0}")]
    Sample(#[from] SampleError),

    #[error("chunk ({}, {}) is outside the block coordinate range", .0.x, .0.z)]
    OutOfRange(Coordinate),

    #[error("classification cancelled by a stop or restart request")]
    Cancelled,
}

/// Провинция не проверена в этом проходе; флаг остаётся поднятым
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("failed to persist province: {0}")]
    Store(#[from] StoreError),
}
