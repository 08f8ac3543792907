// src/terrain.rs
//! Источник биомов для классификации.
//!
//! [`TerrainSampler`] — граница с внешним сервисом мира: один вызов отдаёт имя
//! биома в одной точке. Вызов может быть медленным (сервер догружает или
//! генерирует чанки), поэтому классификатор делает их как можно меньше.
//!
//! [`NoiseTerrain`] строит биомы из шума и позволяет гонять задачу без сервера.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::biome::assign_biome;
use crate::config::TerrainSettings;
use crate::error::SampleError;

/// Запрос биома в точке мира (координаты в блоках)
pub trait TerrainSampler: Send + Sync {
    fn biome_name_at(&self, world: &str, block_x: i32, block_z: i32)
    -> Result<String, SampleError>;
}

/// Детерминированный рельеф на шуме OpenSimplex2 + FBm
pub struct NoiseTerrain {
    world_name: String,
    settings: TerrainSettings,
    elevation: FastNoiseLite,
    temperature: FastNoiseLite,
    humidity: FastNoiseLite,
}

impl NoiseTerrain {
    #[must_use]
    pub fn new(world_name: impl Into<String>, settings: TerrainSettings) -> Self {
        let elevation = fractal_noise(settings.seed, settings.frequency, settings.octaves);
        // Климат меняется медленнее рельефа
        let temperature = fractal_noise(
            settings.seed.wrapping_add(1_000_000),
            settings.frequency * 0.25,
            2,
        );
        let humidity = fractal_noise(
            settings.seed.wrapping_add(2_000_000),
            settings.frequency * 0.5,
            2,
        );

        Self {
            world_name: world_name.into(),
            settings,
            elevation,
            temperature,
            humidity,
        }
    }

    /// Нормированная высота `[0, 1]` в точке
    #[must_use]
    pub fn elevation_at(&self, block_x: i32, block_z: i32) -> f32 {
        normalized(&self.elevation, block_x, block_z)
    }
}

impl TerrainSampler for NoiseTerrain {
    fn biome_name_at(
        &self,
        world: &str,
        block_x: i32,
        block_z: i32,
    ) -> Result<String, SampleError> {
        if world != self.world_name {
            return Err(SampleError::UnknownWorld(world.to_string()));
        }
        let biome = assign_biome(
            self.elevation_at(block_x, block_z),
            normalized(&self.temperature, block_x, block_z),
            normalized(&self.humidity, block_x, block_z),
            self.settings.sea_level,
            self.settings.beach_width,
        );
        Ok(biome.name().to_string())
    }
}

fn fractal_noise(seed: u64, frequency: f32, octaves: i32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(seed as i32));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(octaves));
    noise.set_frequency(Some(frequency));
    noise
}

fn normalized(noise: &FastNoiseLite, block_x: i32, block_z: i32) -> f32 {
    let value = noise.get_noise_2d(block_x as f32, block_z as f32);
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::is_sea_biome;

    #[test]
    fn same_seed_same_biomes() {
        let a = NoiseTerrain::new("world", TerrainSettings::default());
        let b = NoiseTerrain::new("world", TerrainSettings::default());
        for (x, z) in [(0, 0), (120, -64), (-4000, 999), (31_000, 8)] {
            assert_eq!(
                a.biome_name_at("world", x, z).unwrap(),
                b.biome_name_at("world", x, z).unwrap()
            );
        }
    }

    #[test]
    fn unknown_world_is_an_error() {
        let terrain = NoiseTerrain::new("world", TerrainSettings::default());
        assert!(matches!(
            terrain.biome_name_at("nether", 0, 0),
            Err(SampleError::UnknownWorld(name)) if name == "nether"
        ));
    }

    #[test]
    fn sea_level_extremes() {
        let flooded = NoiseTerrain::new(
            "world",
            TerrainSettings {
                sea_level: 1.1,
                ..TerrainSettings::default()
            },
        );
        let dry = NoiseTerrain::new(
            "world",
            TerrainSettings {
                sea_level: -1.0,
                beach_width: 0.0,
                ..TerrainSettings::default()
            },
        );
        for x in (-512..512).step_by(64) {
            assert!(is_sea_biome(&flooded.biome_name_at("world", x, x).unwrap()));
            assert!(!is_sea_biome(&dry.biome_name_at("world", x, -x).unwrap()));
        }
    }
}
