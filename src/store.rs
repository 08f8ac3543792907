// src/store.rs
//! Хранилище провинций.
//!
//! Задача пишет каждую проверенную провинцию сразу, по одной. Формат файла
//! принадлежит реализации [`ProvinceStore`], а не задаче.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::province::{Province, ProvinceRegistry};

/// Синхронная запись одной провинции
pub trait ProvinceStore: Send + Sync {
    fn save(&self, province: &Province) -> Result<(), StoreError>;
}

/// Каталог с файлом `province_<id>.json` на каждую провинцию
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, id: u32) -> PathBuf {
        self.dir.join(format!("province_{id}.json"))
    }

    /// Читает все провинции каталога, упорядочивая по id
    pub fn load_all(&self) -> Result<ProvinceRegistry, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut provinces = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("province_") && n.ends_with(".json"));
            if !is_record {
                continue;
            }
            provinces.push(read_record(&path)?);
        }

        provinces.sort_by_key(Province::id);
        tracing::debug!(count = provinces.len(), dir = %self.dir.display(), "provinces loaded");
        Ok(provinces.into_iter().collect())
    }
}

fn read_record(path: &Path) -> Result<Province, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl ProvinceStore for JsonDirStore {
    fn save(&self, province: &Province) -> Result<(), StoreError> {
        let path = self.path_for(province.id());
        let json = serde_json::to_string_pretty(province).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        // Пишем во временный файл и переименовываем, чтобы не оставить обрезанную запись
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }
}
