// src/map.rs
//! Общий замок карты.
//!
//! Реестр провинций живёт за одним мьютексом. Задача проверки держит его весь
//! проход, отрисовка карты берёт его перед чтением, поэтому отрисовщик никогда
//! не видит провинцию в середине обновления.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use serde::Serialize;

use crate::province::{Province, ProvinceRegistry};

#[derive(Debug, Default)]
pub struct MapState {
    registry: Mutex<ProvinceRegistry>,
}

/// То, что нужно отрисовщику от одной провинции
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceSummary {
    pub id: u32,
    pub name: String,
    pub is_sea: bool,
    pub pending_validation: bool,
}

impl From<&Province> for ProvinceSummary {
    fn from(province: &Province) -> Self {
        Self {
            id: province.id(),
            name: province.name().to_string(),
            is_sea: province.is_sea(),
            pending_validation: province.is_land_validation_requested(),
        }
    }
}

impl From<ProvinceRegistry> for MapState {
    fn from(registry: ProvinceRegistry) -> Self {
        MapState::new(registry)
    }
}

impl MapState {
    #[must_use]
    pub fn new(registry: ProvinceRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
        }
    }

    /// Блокирует до освобождения замка.
    ///
    /// Отравленный замок не страшен: провинции меняются только целиком.
    pub fn lock(&self) -> MutexGuard<'_, ProvinceRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `None`, если замок сейчас занят (например, идёт проход проверки)
    pub fn try_lock(&self) -> Option<MutexGuard<'_, ProvinceRegistry>> {
        match self.registry.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Снимок для отрисовки; ждёт окончания текущего прохода
    pub fn display_snapshot(&self) -> Vec<ProvinceSummary> {
        self.lock().iter().map(ProvinceSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::Coordinate;

    #[test]
    fn try_lock_fails_while_held() {
        let registry: ProvinceRegistry =
            std::iter::once(Province::new(1, "A", [Coordinate::new(0, 0)]).unwrap()).collect();
        let map = MapState::new(registry);

        let guard = map.lock();
        assert!(map.try_lock().is_none());
        drop(guard);

        let snapshot = map.display_snapshot();
        assert_eq!(
            snapshot,
            vec![ProvinceSummary {
                id: 1,
                name: "A".to_string(),
                is_sea: false,
                pending_validation: true,
            }]
        );
    }
}
