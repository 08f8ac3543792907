// src/config.rs
//! Конфигурация проверки суши
//!
//! Этот модуль определяет параметры, которыми управляется фоновая задача:
//! - Имя мира и размер чанка (переводят координаты провинций в блоки)
//! - Настройки выборки биомов (число проб, задержка, сид)
//! - Параметры шумового рельефа для автономного запуска
//!
//! Все структуры поддерживают загрузку из TOML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Настройки выборки биомов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSettings {
    /// Максимальное число проб биома на одну провинцию
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Пауза между пробами в миллисекундах (ограничивает нагрузку на генератор мира)
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u64,

    /// Сид генератора случайных чисел. `None` — случайный сид при каждом запуске.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_samples() -> usize {
    10
}
fn default_sample_delay_ms() -> u64 {
    1500
}

impl ValidationSettings {
    #[must_use]
    pub fn sample_delay(&self) -> Duration {
        Duration::from_millis(self.sample_delay_ms)
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_samples: 10,
            sample_delay_ms: 1500,
            seed: None,
        }
    }
}

/// Параметры шумового рельефа
///
/// Используются [`crate::terrain::NoiseTerrain`], когда внешнего сервиса биомов нет.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSettings {
    #[serde(default = "default_terrain_seed")]
    pub seed: u64,

    /// Частота шума высот (меньше — крупнее континенты)
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    #[serde(default = "default_octaves")]
    pub octaves: i32,

    /// Уровень моря в нормированных высотах `[0, 1]`
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,

    /// Ширина пляжной полосы над уровнем моря
    #[serde(default = "default_beach_width")]
    pub beach_width: f32,
}

fn default_terrain_seed() -> u64 {
    1337
}
fn default_frequency() -> f32 {
    0.004
}
fn default_octaves() -> i32 {
    4
}
fn default_sea_level() -> f32 {
    0.45
}
fn default_beach_width() -> f32 {
    0.03
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 0.004,
            octaves: 4,
            sea_level: 0.45,
            beach_width: 0.03,
        }
    }
}

/// Основные параметры
///
/// Полная конфигурация для одного мира.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandscanConfig {
    /// Имя мира, в котором запрашиваются биомы
    #[serde(default = "default_world_name")]
    pub world_name: String,

    /// Сторона чанка в блоках (по умолчанию 16)
    #[serde(default = "default_chunk_side_length")]
    pub chunk_side_length: i32,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub terrain: TerrainSettings,
}

fn default_world_name() -> String {
    "world".to_string()
}
fn default_chunk_side_length() -> i32 {
    16
}

impl Default for LandscanConfig {
    fn default() -> Self {
        Self {
            world_name: default_world_name(),
            chunk_side_length: 16,
            validation: ValidationSettings::default(),
            terrain: TerrainSettings::default(),
        }
    }
}

impl LandscanConfig {
    /// Загружает параметры из TOML-файла и проверяет их
    ///
    /// # Пример
    /// ```toml
    /// world_name = "world"
    /// chunk_side_length = 16
    ///
    /// [validation]
    /// sample_delay_ms = 500
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "world_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.chunk_side_length <= 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_side_length",
                reason: format!("must be positive, got {}", self.chunk_side_length),
            });
        }
        if self.validation.max_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "validation.max_samples",
                reason: "at least one sample is required".to_string(),
            });
        }
        Ok(())
    }
}
