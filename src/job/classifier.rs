// src/job/classifier.rs
//! Классификация провинции: суша или море.
//!
//! Проверяется не вся провинция, а до `max_samples` случайных чанков (с
//! повторами). Запрос биома дорогой, поэтому первая же сухопутная проба
//! завершает классификацию, и полную цену платят только морские провинции.
//! Ошибки неизбежны; исправляются они вручную, вне этого крейта.

use std::time::Duration;

use rand::Rng;

use crate::biome::is_sea_biome;
use crate::config::LandscanConfig;
use crate::error::ClassifyError;
use crate::job::JobController;
use crate::province::Province;
use crate::terrain::TerrainSampler;

/// Ожидание между пробами
pub trait SampleThrottle {
    /// `Err(Cancelled)`, если ожидание прервано
    fn wait(&self) -> Result<(), ClassifyError>;
}

/// Фиксированная пауза, которую прерывает стоп или рестарт
#[derive(Debug, Clone, Copy)]
pub struct ControlledDelay<'a> {
    controller: &'a JobController,
    delay: Duration,
}

impl<'a> ControlledDelay<'a> {
    #[must_use]
    pub fn new(controller: &'a JobController, delay: Duration) -> Self {
        Self { controller, delay }
    }
}

impl SampleThrottle for ControlledDelay<'_> {
    fn wait(&self) -> Result<(), ClassifyError> {
        if self.controller.wait_for_interrupt(self.delay) {
            Err(ClassifyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub struct LandClassifier<'a> {
    sampler: &'a dyn TerrainSampler,
    world_name: &'a str,
    chunk_side_length: i32,
    max_samples: usize,
}

impl<'a> LandClassifier<'a> {
    #[must_use]
    pub fn new(sampler: &'a dyn TerrainSampler, config: &'a LandscanConfig) -> Self {
        Self {
            sampler,
            world_name: &config.world_name,
            chunk_side_length: config.chunk_side_length,
            max_samples: config.validation.max_samples,
        }
    }

    /// `Ok(true)` — море: все пробы попали в океан или пляж.
    pub fn classify<R, T>(
        &self,
        province: &Province,
        rng: &mut R,
        throttle: &T,
    ) -> Result<bool, ClassifyError>
    where
        R: Rng,
        T: SampleThrottle + ?Sized,
    {
        let coords = province.coords();

        for sample in 0..self.max_samples {
            if sample > 0 {
                throttle.wait()?;
            }

            let coord = coords[rng.gen_range(0..coords.len())];
            let (block_x, block_z) = coord
                .chunk_center(self.chunk_side_length)
                .ok_or(ClassifyError::OutOfRange(coord))?;
            let biome = self
                .sampler
                .biome_name_at(self.world_name, block_x, block_z)?;

            if !is_sea_biome(&biome) {
                tracing::trace!(
                    province_id = province.id(),
                    sample,
                    %biome,
                    "land sample found"
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}
