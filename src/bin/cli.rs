use clap::Parser;
use landscan::logging::init_logging;
use landscan::{
    JobController, JsonDirStore, LandValidationJob, LandscanConfig, MapState, NoiseTerrain,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Проверка суши для провинций: один запуск до завершения
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию — встроенные значения)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Каталог с файлами `province_<id>.json`; результаты пишутся туда же
    #[arg(short, long)]
    provinces: PathBuf,

    /// Сид выборки (перекрывает `validation.seed` из конфигурации)
    #[arg(long)]
    seed: Option<u64>,

    /// Подробный лог
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => LandscanConfig::from_toml_file(path)?,
        None => LandscanConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.validation.seed = Some(seed);
    }

    let store = JsonDirStore::open(&cli.provinces)?;
    let registry = store.load_all()?;
    println!(
        "🔍 Загружено провинций: {} (ждут проверки: {})",
        registry.len(),
        registry.pending_count()
    );

    let terrain = NoiseTerrain::new(config.world_name.clone(), config.terrain.clone());
    let job = LandValidationJob::new(
        Arc::new(config),
        Arc::new(JobController::new()),
        Arc::new(MapState::new(registry)),
        Arc::new(terrain),
        Arc::new(store),
    )?;

    let handle = job.start()?;
    let report = handle
        .join()
        .map_err(|_| "land validation worker panicked")?;

    let sea = job
        .map()
        .display_snapshot()
        .iter()
        .filter(|p| p.is_sea)
        .count();
    println!(
        "\nГотово ({:?})! Проверено: {}, изменилось: {}, ошибок: {}, морских провинций: {}",
        report.outcome, report.validated, report.changed, report.failed, sea
    );
    Ok(())
}
