pub mod registry;

use serde::{Deserialize, Serialize};

use crate::error::ProvinceError;

pub use registry::ProvinceRegistry;

/// Клетка сетки провинции в единицах чанков
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub z: i32,
}

impl Coordinate {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Блок примерно в центре чанка: `coord * side + side / 2`.
    /// `None`, если блок не помещается в `i32`.
    #[must_use]
    pub fn chunk_center(self, chunk_side_length: i32) -> Option<(i32, i32)> {
        let half = chunk_side_length / 2;
        let block = |v: i32| v.checked_mul(chunk_side_length)?.checked_add(half);
        Some((block(self.x)?, block(self.z)?))
    }
}

/// Провинция: набор клеток и результат последней проверки суши.
///
/// `is_sea` меняет только шаг классификации, а флаг
/// `land_validation_requested` снимается только после успешной записи.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProvinceRecord")]
pub struct Province {
    id: u32,
    name: String,
    coords: Vec<Coordinate>,
    is_sea: bool,
    land_validation_requested: bool,
}

/// Сырая запись из файла до проверки инвариантов
#[derive(Deserialize)]
struct ProvinceRecord {
    id: u32,
    name: String,
    coords: Vec<Coordinate>,
    #[serde(default)]
    is_sea: bool,
    #[serde(default = "default_requested")]
    land_validation_requested: bool,
}

fn default_requested() -> bool {
    true
}

impl TryFrom<ProvinceRecord> for Province {
    type Error = ProvinceError;

    fn try_from(record: ProvinceRecord) -> Result<Self, Self::Error> {
        let mut province = Province::new(record.id, record.name, record.coords)?;
        province.is_sea = record.is_sea;
        province.land_validation_requested = record.land_validation_requested;
        Ok(province)
    }
}

impl Province {
    /// Новая провинция всегда ждёт проверки суши.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        coords: impl IntoIterator<Item = Coordinate>,
    ) -> Result<Self, ProvinceError> {
        Ok(Self {
            id,
            name: name.into(),
            coords: normalize_coords(id, coords)?,
            is_sea: false,
            land_validation_requested: true,
        })
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Клетки провинции без повторов, всегда хотя бы одна
    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    #[must_use]
    pub fn is_sea(&self) -> bool {
        self.is_sea
    }

    #[must_use]
    pub fn is_land_validation_requested(&self) -> bool {
        self.land_validation_requested
    }

    /// Меняет форму провинции; после этого её нужно проверить заново.
    pub fn reshape(
        &mut self,
        coords: impl IntoIterator<Item = Coordinate>,
    ) -> Result<(), ProvinceError> {
        self.coords = normalize_coords(self.id, coords)?;
        self.land_validation_requested = true;
        Ok(())
    }

    pub fn request_land_validation(&mut self) {
        self.land_validation_requested = true;
    }

    /// Копия с результатом классификации и снятым флагом, готовая к записи.
    pub(crate) fn validated(&self, is_sea: bool) -> Self {
        Self {
            is_sea,
            land_validation_requested: false,
            ..self.clone()
        }
    }
}

fn normalize_coords(
    id: u32,
    coords: impl IntoIterator<Item = Coordinate>,
) -> Result<Vec<Coordinate>, ProvinceError> {
    let mut coords: Vec<Coordinate> = coords.into_iter().collect();
    coords.sort_unstable();
    coords.dedup();
    if coords.is_empty() {
        return Err(ProvinceError::NoCoordinates(id));
    }
    Ok(coords)
}
