use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use landscan::error::{SampleError, StoreError};
use landscan::{
    Coordinate, JobController, JobEvent, LandValidationJob, LandscanConfig, MapState,
    ProgressSink, Province, ProvinceRegistry, ProvinceStore, TerrainSampler,
};

/// Биом по координатам блока; для неизвестных точек — `default`.
///
/// `<down>` — ошибка опроса, `<panic>` — паника при первом обращении
/// (дальше точка считается океаном).
#[allow(dead_code)]
pub struct MapSampler {
    biomes: HashMap<(i32, i32), &'static str>,
    default: &'static str,
    calls: AtomicUsize,
    panicked: AtomicBool,
}

#[allow(dead_code)]
impl MapSampler {
    pub fn uniform(default: &'static str) -> Self {
        Self {
            biomes: HashMap::new(),
            default,
            calls: AtomicUsize::new(0),
            panicked: AtomicBool::new(false),
        }
    }

    /// Биом для чанка (при стороне 16 центр чанка — `coord * 16 + 8`)
    pub fn with_chunk(mut self, x: i32, z: i32, biome: &'static str) -> Self {
        let center = Coordinate::new(x, z).chunk_center(16).unwrap();
        self.biomes.insert(center, biome);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TerrainSampler for MapSampler {
    fn biome_name_at(&self, _world: &str, x: i32, z: i32) -> Result<String, SampleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.biomes.get(&(x, z)).copied().unwrap_or(self.default) {
            "<down>" => Err(SampleError::Unavailable("chunk generation timed out".into())),
            "<panic>" if !self.panicked.swap(true, Ordering::SeqCst) => {
                panic!("terrain backend crashed at ({x}, {z})")
            }
            "<panic>" => Ok("OCEAN".to_string()),
            name => Ok(name.to_string()),
        }
    }
}

/// Запоминает каждую запись; может отказывать для выбранных id
#[derive(Default)]
pub struct RecordingStore {
    saved: Mutex<Vec<Province>>,
    reject: HashSet<u32>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn rejecting(ids: &[u32]) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            reject: ids.iter().copied().collect(),
        }
    }

    pub fn saved(&self) -> Vec<Province> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saved_ids(&self) -> Vec<u32> {
        self.saved().iter().map(Province::id).collect()
    }
}

impl ProvinceStore for RecordingStore {
    fn save(&self, province: &Province) -> Result<(), StoreError> {
        if self.reject.contains(&province.id()) {
            return Err(StoreError::Io {
                path: PathBuf::from(format!("province_{}.json", province.id())),
                source: io::Error::other("disk full"),
            });
        }
        self.saved.lock().unwrap().push(province.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<JobEvent>>);

impl RecordingSink {
    pub fn events(&self) -> Vec<JobEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Проценты прогресса по проходам: `(pass, percent)`
    pub fn progress(&self) -> Vec<(u32, u8)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                JobEvent::Progress { pass, percent, .. } => Some((pass, percent)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, event: &JobEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

pub fn config() -> LandscanConfig {
    let mut config = LandscanConfig::default();
    config.validation.sample_delay_ms = 0;
    config.validation.seed = Some(7);
    config
}

pub fn province(id: u32, coords: &[(i32, i32)]) -> Province {
    Province::new(
        id,
        format!("Prov_{id}"),
        coords.iter().map(|&(x, z)| Coordinate::new(x, z)),
    )
    .unwrap()
}

/// Провинция в том виде, в каком её восстановил загрузчик
pub fn restored(id: u32, coords: &[(i32, i32)], is_sea: bool, requested: bool) -> Province {
    let coords: Vec<_> = coords
        .iter()
        .map(|&(x, z)| serde_json::json!({ "x": x, "z": z }))
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Prov_{id}"),
        "coords": coords,
        "is_sea": is_sea,
        "land_validation_requested": requested,
    }))
    .unwrap()
}

#[allow(dead_code)]
pub struct Harness {
    pub controller: Arc<JobController>,
    pub map: Arc<MapState>,
    pub sampler: Arc<MapSampler>,
    pub store: Arc<RecordingStore>,
    pub events: Arc<RecordingSink>,
    pub job: LandValidationJob,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(provinces: Vec<Province>, sampler: MapSampler) -> Self {
        Self::with(provinces, sampler, RecordingStore::default(), config())
    }

    pub fn with(
        provinces: Vec<Province>,
        sampler: MapSampler,
        store: RecordingStore,
        config: LandscanConfig,
    ) -> Self {
        let controller = Arc::new(JobController::new());
        let map = Arc::new(MapState::new(provinces.into_iter().collect::<ProvinceRegistry>()));
        let sampler = Arc::new(sampler);
        let store = Arc::new(store);
        let events = Arc::new(RecordingSink::default());
        let job = LandValidationJob::new(
            Arc::new(config),
            Arc::clone(&controller),
            Arc::clone(&map),
            Arc::clone(&sampler) as Arc<dyn TerrainSampler>,
            Arc::clone(&store) as Arc<dyn ProvinceStore>,
        )
        .unwrap()
        .with_sink(Arc::clone(&events) as Arc<dyn ProgressSink>);

        Self {
            controller,
            map,
            sampler,
            store,
            events,
            job,
        }
    }

    /// Тот же набор, но с дополнительным получателем событий, который может
    /// дёргать контроллер (вызывается после записи в `events`)
    pub fn react(
        mut self,
        reaction: impl Fn(&JobController, &JobEvent) + Send + Sync + 'static,
    ) -> Self {
        let controller = Arc::clone(&self.controller);
        let events = Arc::clone(&self.events);
        let sink = move |event: &JobEvent| {
            events.report(event);
            reaction(&controller, event);
        };
        self.job = self.job.clone().with_sink(Arc::new(sink));
        self
    }

    pub fn province(&self, id: u32) -> Province {
        self.map.lock().get(id).unwrap().clone()
    }
}
