pub mod biome;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod map;
pub mod province;
pub mod store;
pub mod terrain;

pub use config::{LandscanConfig, TerrainSettings, ValidationSettings};
pub use job::{JobController, JobEvent, JobStatus, LandValidationJob, PassOutcome, ProgressSink};
pub use map::MapState;
pub use province::{Coordinate, Province, ProvinceRegistry};
pub use store::{JsonDirStore, ProvinceStore};
pub use terrain::{NoiseTerrain, TerrainSampler};
