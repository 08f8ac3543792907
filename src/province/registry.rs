use std::collections::HashMap;

use crate::province::Province;

/// Все провинции активного мира в порядке добавления
#[derive(Debug, Clone, Default)]
pub struct ProvinceRegistry {
    provinces: Vec<Province>,
    // id -> индекс в `provinces`
    index: HashMap<u32, usize>,
}

impl ProvinceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет провинцию или заменяет существующую с тем же id (позиция сохраняется).
    /// Возвращает заменённую провинцию.
    pub fn insert(&mut self, province: Province) -> Option<Province> {
        if let Some(&idx) = self.index.get(&province.id()) {
            return Some(std::mem::replace(&mut self.provinces[idx], province));
        }
        self.index.insert(province.id(), self.provinces.len());
        self.provinces.push(province);
        None
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Province> {
        self.index.get(&id).map(|&idx| &self.provinces[idx])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Province> {
        self.index.get(&id).map(|&idx| &mut self.provinces[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Province> {
        self.provinces.iter()
    }

    /// Провинции с поднятым флагом проверки
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.provinces
            .iter()
            .filter(|p| p.is_land_validation_requested())
            .count()
    }

    pub(crate) fn get_at(&self, position: usize) -> Option<&Province> {
        self.provinces.get(position)
    }

    pub(crate) fn replace_at(&mut self, position: usize, province: Province) {
        debug_assert_eq!(self.provinces[position].id(), province.id());
        self.provinces[position] = province;
    }
}

impl FromIterator<Province> for ProvinceRegistry {
    fn from_iter<I: IntoIterator<Item = Province>>(iter: I) -> Self {
        let mut registry = Self::new();
        for province in iter {
            registry.insert(province);
        }
        registry
    }
}
