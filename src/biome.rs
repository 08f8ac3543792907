#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    Ocean,
    Beach,
    Ice,
    Tundra,
    Taiga,
    TemperateForest,
    TropicalRainforest,
    Grassland,
    Savanna,
    Desert,
    Swamp,
    Mountain,
}

impl Biome {
    /// Имя биома в том виде, в каком его отдаёт сервер мира
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Biome::Ocean => "OCEAN",
            Biome::Beach => "BEACH",
            Biome::Ice => "ICE_SPIKES",
            Biome::Tundra => "SNOWY_PLAINS",
            Biome::Taiga => "TAIGA",
            Biome::TemperateForest => "FOREST",
            Biome::TropicalRainforest => "JUNGLE",
            Biome::Grassland => "PLAINS",
            Biome::Savanna => "SAVANNA",
            Biome::Desert => "DESERT",
            Biome::Swamp => "SWAMP",
            Biome::Mountain => "STONY_PEAKS",
        }
    }
}

/// Считается ли биом морским: имя содержит `ocean` или `beach` без учёта регистра.
///
/// `DEEP_OCEAN` и `SNOWY_BEACH` — море, `STONY_SHORE` — суша.
#[must_use]
pub fn is_sea_biome(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("ocean") || name.contains("beach")
}

/// Назначает биом точке на основе высоты, температуры и влажности
///
/// Все входы нормированы в `[0, 1]`.
#[must_use]
pub fn assign_biome(
    elevation: f32,
    temperature: f32,
    humidity: f32,
    sea_level: f32,
    beach_width: f32,
) -> Biome {
    if elevation < sea_level {
        return Biome::Ocean;
    }
    if elevation < sea_level + beach_width {
        return Biome::Beach;
    }

    // Горы: на холоде превращаются в лёд
    if elevation > 0.85 {
        return Biome::Mountain;
    }
    if elevation > 0.75 && temperature < 0.3 {
        return Biome::Ice;
    }

    if temperature < 0.15 {
        Biome::Ice
    } else if temperature < 0.3 {
        if humidity < 0.4 {
            Biome::Tundra
        } else {
            Biome::Taiga
        }
    } else if temperature < 0.65 {
        if humidity < 0.35 {
            Biome::Grassland
        } else if humidity < 0.7 {
            Biome::TemperateForest
        } else {
            Biome::Swamp
        }
    } else if humidity < 0.25 {
        Biome::Desert
    } else if humidity < 0.55 {
        Biome::Savanna
    } else {
        Biome::TropicalRainforest
    }
}
