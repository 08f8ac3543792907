// src/job/task.rs
//! Рабочий цикл проверки суши.
//!
//! Один проход — один обход реестра под замком карты. Замок держится весь
//! проход, а не по провинции: отрисовщик ждёт, зато не видит полуобновлённых
//! данных. Каждая провинция записывается сразу, поэтому остановленный проход
//! оставляет смесь проверенных и ждущих провинций, и это нормально: следующий
//! проход их досчитает.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::LandscanConfig;
use crate::error::{ClassifyError, ConfigError, ControlError, ValidationError};
use crate::job::classifier::{ControlledDelay, LandClassifier};
use crate::job::controller::Checkpoint;
use crate::job::{JobController, JobEvent, ProgressSink, TracingSink};
use crate::map::MapState;
use crate::province::Province;
use crate::store::ProvinceStore;
use crate::terrain::TerrainSampler;

/// Чем закончился запуск
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassOutcome {
    /// Реестр пройден до конца
    #[default]
    Completed,
    Stopped,
    Paused,
}

/// Итог запуска (всех проходов, включая перезапуски)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub outcome: PassOutcome,
    pub passes: u32,
    /// Учтено провинций в последнем проходе
    pub processed: usize,
    /// Проверено и записано
    pub validated: usize,
    /// Из них сменили сушу на море или наоборот
    pub changed: usize,
    pub failed: usize,
}

enum PassEnd {
    Restart,
    Done(PassOutcome),
}

/// Если рабочий поток падает посреди прохода, автомат всё равно приходит
/// в `Stopped`, иначе следующий старт получил бы `AlreadyRunning`.
struct StopOnUnwind<'a> {
    controller: &'a JobController,
    sink: &'a dyn ProgressSink,
    processed: usize,
    total: usize,
}

impl Drop for StopOnUnwind<'_> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        tracing::error!(
            processed = self.processed,
            total = self.total,
            "Land validation worker panicked"
        );
        self.controller.abort_start();
        self.sink.report(&JobEvent::Stopped {
            processed: self.processed,
            total: self.total,
        });
    }
}

#[derive(Clone)]
pub struct LandValidationJob {
    config: Arc<LandscanConfig>,
    controller: Arc<JobController>,
    map: Arc<MapState>,
    sampler: Arc<dyn TerrainSampler>,
    store: Arc<dyn ProvinceStore>,
    sink: Arc<dyn ProgressSink>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl LandValidationJob {
    /// Конфигурация проверяется здесь же: собранная в коде, а не из файла,
    /// она иначе дошла бы до классификатора с нулём проб.
    pub fn new(
        config: Arc<LandscanConfig>,
        controller: Arc<JobController>,
        map: Arc<MapState>,
        sampler: Arc<dyn TerrainSampler>,
        store: Arc<dyn ProvinceStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.validation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            config,
            controller,
            map,
            sampler,
            store,
            sink: Arc::new(TracingSink),
            rng: Arc::new(Mutex::new(rng)),
        })
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<JobController> {
        &self.controller
    }

    #[must_use]
    pub fn map(&self) -> &Arc<MapState> {
        &self.map
    }

    /// Запрашивает старт и запускает проход в отдельном потоке.
    pub fn start(&self) -> Result<JoinHandle<JobReport>, ControlError> {
        self.controller.request_start()?;

        let job = self.clone();
        thread::Builder::new()
            .name("land-validation".to_string())
            .spawn(move || job.run())
            .map_err(|e| {
                self.controller.abort_start();
                ControlError::Spawn(e.to_string())
            })
    }

    /// То же, что [`Self::start`], но в текущем потоке.
    pub fn run_blocking(&self) -> Result<JobReport, ControlError> {
        self.controller.request_start()?;
        Ok(self.run())
    }

    fn run(&self) -> JobReport {
        let mut report = JobReport::default();

        loop {
            report.passes += 1;
            match self.run_pass(report.passes, &mut report) {
                PassEnd::Restart => {
                    self.sink.report(&JobEvent::Restarting {
                        pass: report.passes,
                    });
                }
                PassEnd::Done(outcome) => {
                    report.outcome = outcome;
                    return report;
                }
            }
        }
    }

    fn run_pass(&self, pass: u32, report: &mut JobReport) -> PassEnd {
        let mut registry = self.map.lock();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let total = registry.len();
        let mut unwind = StopOnUnwind {
            controller: &self.controller,
            sink: self.sink.as_ref(),
            processed: 0,
            total,
        };
        self.sink.report(&JobEvent::Starting { pass, total });

        let classifier = LandClassifier::new(self.sampler.as_ref(), &self.config);
        let throttle = ControlledDelay::new(&self.controller, self.config.validation.sample_delay());

        report.processed = 0;
        for position in 0..total {
            let Some(province) = registry.get_at(position) else {
                break;
            };

            // Прерванная классификация не засчитывается: провинция ещё ждёт
            let mut accounted = true;
            if province.is_land_validation_requested() {
                let id = province.id();
                let was_sea = province.is_sea();
                match self.validate(&classifier, &throttle, &mut *rng, province) {
                    Ok(updated) => {
                        report.validated += 1;
                        if updated.is_sea() != was_sea {
                            report.changed += 1;
                        }
                        tracing::debug!(
                            province_id = id,
                            is_sea = updated.is_sea(),
                            "province validated"
                        );
                        registry.replace_at(position, updated);
                    }
                    Err(ValidationError::Classify(ClassifyError::Cancelled)) => {
                        tracing::debug!(province_id = id, "classification cancelled");
                        accounted = false;
                    }
                    Err(e) => {
                        report.failed += 1;
                        self.sink.report(&JobEvent::ProvinceFailed {
                            province_id: id,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if accounted {
                report.processed += 1;
                unwind.processed = report.processed;
                self.sink.report(&JobEvent::Progress {
                    pass,
                    processed: report.processed,
                    total,
                    percent: percent(report.processed, total),
                });
            }

            match self.controller.checkpoint() {
                Checkpoint::Continue => {}
                Checkpoint::Restart => return PassEnd::Restart,
                Checkpoint::Paused => {
                    self.sink.report(&JobEvent::Paused {
                        processed: report.processed,
                        total,
                    });
                    return PassEnd::Done(PassOutcome::Paused);
                }
                Checkpoint::Stopped => {
                    self.sink.report(&JobEvent::Stopped {
                        processed: report.processed,
                        total,
                    });
                    return PassEnd::Done(PassOutcome::Stopped);
                }
            }
        }

        if total == 0 {
            self.sink.report(&JobEvent::Progress {
                pass,
                processed: 0,
                total,
                percent: 100,
            });
        }

        match self.controller.complete_pass() {
            Checkpoint::Restart => PassEnd::Restart,
            _ => {
                self.sink.report(&JobEvent::Completed { pass, total });
                PassEnd::Done(PassOutcome::Completed)
            }
        }
    }

    /// Классифицирует и записывает. Реестр обновляется вызывающим только после
    /// успешной записи, иначе провинция остаётся как была, с поднятым флагом.
    fn validate(
        &self,
        classifier: &LandClassifier<'_>,
        throttle: &ControlledDelay<'_>,
        rng: &mut ChaCha8Rng,
        province: &Province,
    ) -> Result<Province, ValidationError> {
        let is_sea = classifier.classify(province, rng, throttle)?;
        let updated = province.validated(is_sea);
        self.store.save(&updated)?;
        Ok(updated)
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (processed * 100 / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SampleError, StoreError};
    use crate::province::{Coordinate, ProvinceRegistry};

    struct Fixed(&'static str);

    impl TerrainSampler for Fixed {
        fn biome_name_at(&self, _: &str, _: i32, _: i32) -> Result<String, SampleError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct MemoryStore(Mutex<Vec<u32>>);

    impl ProvinceStore for MemoryStore {
        fn save(&self, province: &Province) -> Result<(), StoreError> {
            self.0.lock().unwrap().push(province.id());
            Ok(())
        }
    }

    fn job(registry: ProvinceRegistry, biome: &'static str) -> LandValidationJob {
        let mut config = LandscanConfig::default();
        config.validation.sample_delay_ms = 0;
        config.validation.seed = Some(1);
        LandValidationJob::new(
            Arc::new(config),
            Arc::new(JobController::new()),
            Arc::new(registry.into()),
            Arc::new(Fixed(biome)),
            Arc::new(MemoryStore::default()),
        )
        .unwrap()
    }

    #[test]
    fn config_without_samples_is_rejected() {
        let mut config = LandscanConfig::default();
        config.validation.max_samples = 0;
        let err = LandValidationJob::new(
            Arc::new(config),
            Arc::new(JobController::new()),
            Arc::new(MapState::default()),
            Arc::new(Fixed("OCEAN")),
            Arc::new(MemoryStore::default()),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "validation.max_samples",
                ..
            }
        ));

        let mut config = LandscanConfig::default();
        config.chunk_side_length = 0;
        assert!(
            LandValidationJob::new(
                Arc::new(config),
                Arc::new(JobController::new()),
                Arc::new(MapState::default()),
                Arc::new(Fixed("OCEAN")),
                Arc::new(MemoryStore::default()),
            )
            .is_err()
        );
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn empty_registry_completes() {
        let job = job(ProvinceRegistry::new(), "OCEAN");
        let report = job.run_blocking().unwrap();
        assert_eq!(report.outcome, PassOutcome::Completed);
        assert_eq!(report.passes, 1);
        assert_eq!(job.controller().status(), crate::job::JobStatus::Stopped);
    }

    #[test]
    fn counts_changes() {
        let registry: ProvinceRegistry = (1..=3)
            .map(|id| Province::new(id, "P", [Coordinate::new(id as i32, 0)]).unwrap())
            .collect();
        let job = job(registry, "WARM_OCEAN");

        let report = job.run_blocking().unwrap();
        assert_eq!(report.validated, 3);
        assert_eq!(report.changed, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.processed, 3);
        assert_eq!(job.map().lock().pending_count(), 0);

        // Второй запуск ничего не трогает
        let report = job.run_blocking().unwrap();
        assert_eq!(report.validated, 0);
        assert_eq!(report.processed, 3);
    }
}
