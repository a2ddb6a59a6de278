use std::io::Write;

use polars::prelude::*;
use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;
use crate::schema::{ORCHID_SCHEMA, SOURCE_ORDER_COLUMN, columns};

/// Configuration for test data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDataConfig {
    /// Number of rows to write. Rows beyond the curated sample repeat it.
    pub rows: usize,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self::sample()
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self { rows: 3 }
    }

    /// Sample data for integration tests
    pub fn sample() -> Self {
        Self {
            rows: SAMPLE_ORCHIDS.len(),
        }
    }
}

/// One curated catalog row. Columns not listed here are left empty.
#[derive(Debug, Clone, Copy)]
struct SampleOrchid {
    species_key: i64,
    scientific_name: &'static str,
    genus: &'static str,
    common_names: Option<&'static str>,
    flower_color: &'static str,
    fragrance: &'static str,
    fragrance_description: Option<&'static str>,
    native_regions: &'static str,
    native_habitat: &'static str,
    temperature: (f64, f64),
    temperature_preference: &'static str,
    difficulty: &'static str,
    special_features: &'static str,
    growth_habit: &'static str,
    blooming_season: &'static str,
    petal_shape: &'static str,
    lip_color: Option<&'static str>,
    horticultural_notes: &'static str,
}

const SAMPLE_ORCHIDS: [SampleOrchid; 12] = [
    SampleOrchid {
        species_key: 2_849_101,
        scientific_name: "Phalaenopsis amabilis (L.) Blume",
        genus: "Phalaenopsis",
        common_names: Some("Moon orchid, Moth orchid"),
        flower_color: "White",
        fragrance: "Slightly fragrant",
        fragrance_description: Some("Faint sweet scent in the morning"),
        native_regions: "Indonesia, Philippines, Malaysia",
        native_habitat: "Lowland rainforest, epiphytic on trees",
        temperature: (18.0, 29.0),
        temperature_preference: "Warm",
        difficulty: "Easy",
        special_features: "National flower of Indonesia",
        growth_habit: "Epiphytic",
        blooming_season: "Spring",
        petal_shape: "Rounded",
        lip_color: Some("White with yellow"),
        horticultural_notes: "Keep evenly moist and avoid water in the crown",
    },
    SampleOrchid {
        species_key: 2_850_330,
        scientific_name: "Vanda coerulea Griff. ex Lindl.",
        genus: "Vanda",
        common_names: Some("Blue vanda"),
        flower_color: "Blue to violet",
        fragrance: "Non-fragrant",
        fragrance_description: None,
        native_regions: "India, Myanmar, Thailand",
        native_habitat: "Montane forests with strong air movement",
        temperature: (10.0, 28.0),
        temperature_preference: "Intermediate",
        difficulty: "Difficult",
        special_features: "One of the few truly blue orchids",
        growth_habit: "Epiphytic",
        blooming_season: "Autumn",
        petal_shape: "Tessellated",
        lip_color: Some("Dark blue"),
        horticultural_notes: "Grow in hanging baskets with bare roots",
    },
    SampleOrchid {
        species_key: 2_851_002,
        scientific_name: "Paphiopedilum insigne (Wall. ex Lindl.) Pfitzer",
        genus: "Paphiopedilum",
        common_names: Some("Lady's slipper orchid"),
        flower_color: "Green, brown and white",
        fragrance: "Non-fragrant",
        fragrance_description: None,
        native_regions: "India, Nepal, Bhutan",
        native_habitat: "Limestone cliffs in cool forests",
        temperature: (10.0, 24.0),
        temperature_preference: "Cool to intermediate",
        difficulty: "Moderate",
        special_features: "Lip forms the \"slipper pouch that traps pollinators",
        growth_habit: "Terrestrial",
        blooming_season: "Winter",
        petal_shape: "Spotted dorsal sepal",
        lip_color: Some("Brown"),
        horticultural_notes: "Keep moist, there are no pseudobulbs to store water",
    },
    SampleOrchid {
        species_key: 2_852_417,
        scientific_name: "Cattleya labiata Lindl.",
        genus: "Cattleya",
        common_names: Some("Ruby-lipped cattleya, Queen of orchids"),
        flower_color: "Lavender pink",
        fragrance: "Fragrant",
        fragrance_description: Some("Strong sweet fragrance"),
        native_regions: "Brazil",
        native_habitat: "Humid coastal forests",
        temperature: (15.0, 30.0),
        temperature_preference: "Intermediate to warm",
        difficulty: "Moderate",
        special_features: "Classic corsage orchid",
        growth_habit: "Epiphytic",
        blooming_season: "Autumn",
        petal_shape: "Ruffled",
        lip_color: Some("Magenta with yellow throat"),
        horticultural_notes: "Allow to dry between waterings",
    },
    SampleOrchid {
        species_key: 2_853_118,
        scientific_name: "Dendrobium nobile Lindl.",
        genus: "Dendrobium",
        common_names: Some("Noble dendrobium"),
        flower_color: "Pink and white",
        fragrance: "Fragrant",
        fragrance_description: Some("Light honey scent"),
        native_regions: "China, India, Thailand, Vietnam",
        native_habitat: "Deciduous forests in monsoon regions",
        temperature: (10.0, 28.0),
        temperature_preference: "Cool to warm",
        difficulty: "Moderate",
        special_features: "Used in traditional medicine",
        growth_habit: "Epiphytic",
        blooming_season: "Winter to spring",
        petal_shape: "Oblong",
        lip_color: Some("Purple blotch"),
        horticultural_notes: "Needs a cool dry rest to initiate blooms",
    },
    SampleOrchid {
        species_key: 2_854_560,
        scientific_name: "Cymbidium ensifolium (L.) Sw.",
        genus: "Cymbidium",
        common_names: Some("Four-season orchid, Golden-thread orchid"),
        flower_color: "Yellowish green",
        fragrance: "Fragrant",
        fragrance_description: Some("Intense citrus fragrance"),
        native_regions: "China, Japan, Taiwan",
        native_habitat: "Forest floor",
        temperature: (5.0, 25.0),
        temperature_preference: "Cool",
        difficulty: "Easy",
        special_features: "Cultivated in China for centuries",
        growth_habit: "Terrestrial",
        blooming_season: "Summer to autumn",
        petal_shape: "Narrow",
        lip_color: Some("Pale with red spots"),
        horticultural_notes: "Use a free-draining bark mix",
    },
    SampleOrchid {
        species_key: 2_855_014,
        scientific_name: "Masdevallia veitchiana Rchb.f.",
        genus: "Masdevallia",
        common_names: Some("King of the masdevallias"),
        flower_color: "Scarlet orange",
        fragrance: "Non-fragrant",
        fragrance_description: None,
        native_regions: "Peru",
        native_habitat: "High Andes among rocks",
        temperature: (7.0, 20.0),
        temperature_preference: "Cool",
        difficulty: "Difficult",
        special_features: "Iridescent purple hairs on the sepals",
        growth_habit: "Lithophytic",
        blooming_season: "Spring",
        petal_shape: "Triangular",
        lip_color: None,
        horticultural_notes: "Never let it dry out and give cool nights",
    },
    SampleOrchid {
        species_key: 2_856_207,
        scientific_name: "Miltoniopsis vexillaria (Rchb.f.) Garay & Dunst.",
        genus: "Miltoniopsis",
        common_names: Some("Pansy orchid"),
        flower_color: "Rose pink",
        fragrance: "Fragrant",
        fragrance_description: Some("Rose-like scent"),
        native_regions: "Colombia, Ecuador",
        native_habitat: "Cloud forests",
        temperature: (12.0, 24.0),
        temperature_preference: "Intermediate",
        difficulty: "Moderate",
        special_features: "Flowers resemble pansies",
        growth_habit: "Epiphytic",
        blooming_season: "Spring",
        petal_shape: "Flat",
        lip_color: Some("Pink with white mask"),
        horticultural_notes: "Keep out of direct midday sun",
    },
    SampleOrchid {
        species_key: 2_857_731,
        scientific_name: "Oncidium sphacelatum Lindl.",
        genus: "Oncidium",
        common_names: Some("Dancing lady orchid, Golden shower"),
        flower_color: "Golden yellow",
        fragrance: "Slightly fragrant",
        fragrance_description: Some("Faint spicy scent"),
        native_regions: "Mexico, Guatemala, Honduras",
        native_habitat: "Seasonally dry forests",
        temperature: (13.0, 30.0),
        temperature_preference: "Intermediate to warm",
        difficulty: "Easy",
        special_features: "Branched sprays of hundreds of flowers",
        growth_habit: "Epiphytic",
        blooming_season: "Spring",
        petal_shape: "Wavy",
        lip_color: Some("Yellow with brown bars"),
        horticultural_notes: "Water freely while pseudobulbs develop",
    },
    SampleOrchid {
        species_key: 2_858_102,
        scientific_name: "Vanilla planifolia Andrews",
        genus: "Vanilla",
        common_names: Some("Flat-leaved vanilla"),
        flower_color: "Greenish yellow",
        fragrance: "Fragrant",
        fragrance_description: Some("Cured pods give vanilla flavour"),
        native_regions: "Mexico, Central America",
        native_habitat: "Tropical lowland forest, climbing vine",
        temperature: (18.0, 32.0),
        temperature_preference: "Warm",
        difficulty: "Moderate",
        special_features: "Source of natural vanilla",
        growth_habit: "Vining",
        blooming_season: "Spring",
        petal_shape: "Tubular",
        lip_color: Some("Yellow"),
        horticultural_notes: "Provide a sturdy support to climb",
    },
    SampleOrchid {
        species_key: 2_849_188,
        scientific_name: "Phalaenopsis schilleriana Rchb.f.",
        genus: "Phalaenopsis",
        common_names: Some("Schiller's moth orchid"),
        flower_color: "Pink",
        fragrance: "Fragrant",
        fragrance_description: Some("Peppery rose scent"),
        native_regions: "Philippines",
        native_habitat: "Lowland forests",
        temperature: (18.0, 30.0),
        temperature_preference: "Warm",
        difficulty: "Easy",
        special_features: "Silver-mottled leaves",
        growth_habit: "Epiphytic",
        blooming_season: "Winter to spring",
        petal_shape: "Rounded",
        lip_color: Some("Pink"),
        horticultural_notes: "Mount or pot in sphagnum",
    },
    SampleOrchid {
        species_key: 2_859_440,
        scientific_name: "Bulbophyllum echinolabium J.J.Sm.",
        genus: "Bulbophyllum",
        common_names: None,
        flower_color: "Red and yellow",
        fragrance: "Fragrant",
        fragrance_description: Some("Carrion odour attracts flies"),
        native_regions: "Indonesia, Sulawesi",
        native_habitat: "Lowland rainforest",
        temperature: (18.0, 30.0),
        temperature_preference: "Warm",
        difficulty: "Moderate",
        special_features: "One of the largest flowers in the genus",
        growth_habit: "Epiphytic",
        blooming_season: "Year-round",
        petal_shape: "Narrow",
        lip_color: Some("Red"),
        horticultural_notes: "High humidity and steady warmth",
    },
];

impl SampleOrchid {
    fn value(&self, column: &str) -> Option<String> {
        let value = match column {
            columns::SPECIES_KEY => return Some(self.species_key.to_string()),
            columns::TEMPERATURE_MIN_C => return Some(self.temperature.0.to_string()),
            columns::TEMPERATURE_MAX_C => return Some(self.temperature.1.to_string()),
            columns::SCIENTIFIC_NAME => self.scientific_name,
            columns::GENUS => self.genus,
            columns::COMMON_NAMES => self.common_names?,
            columns::FLOWER_COLOR => self.flower_color,
            columns::FRAGRANCE => self.fragrance,
            columns::FRAGRANCE_DESCRIPTION => self.fragrance_description?,
            columns::NATIVE_REGIONS => self.native_regions,
            columns::NATIVE_HABITAT => self.native_habitat,
            columns::TEMPERATURE_PREFERENCE => self.temperature_preference,
            columns::HORTICULTURAL_DIFFICULTY => self.difficulty,
            columns::SPECIAL_FEATURES => self.special_features,
            columns::GROWTH_HABIT => self.growth_habit,
            columns::BLOOMING_SEASON => self.blooming_season,
            columns::PETAL_SHAPE => self.petal_shape,
            columns::LIP_COLOR => self.lip_color?,
            columns::HORTICULTURAL_NOTES => self.horticultural_notes,
            columns::ORDER_NAME => "Asparagales",
            "Kingdom" => "Plantae",
            "Family" => "Orchidaceae",
            "Taxonomic_Status" => "Accepted",
            _ => return None,
        };
        Some(value.to_string())
    }
}

/// Build the test catalog as a raw frame, with source headers (`Order` rather
/// than `Order_Name`) and every value as text, the way a CSV reader sees it.
pub fn create_test_frame(config: &TestDataConfig) -> Result<DataFrame> {
    let rows: Vec<&SampleOrchid> = SAMPLE_ORCHIDS.iter().cycle().take(config.rows).collect();

    let columns = ORCHID_SCHEMA
        .iter()
        .map(|(name, _)| {
            let header = if name.as_str() == columns::ORDER_NAME {
                SOURCE_ORDER_COLUMN
            } else {
                name.as_str()
            };
            let values: Vec<Option<String>> =
                rows.iter().map(|row| row.value(name.as_str())).collect();
            Column::new(header.into(), values)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Create a CSV file holding the test catalog.
pub fn create_test_data(config: &TestDataConfig) -> Result<NamedTempFile> {
    info!(rows = config.rows, "Creating orchid test data");

    let mut df = create_test_frame(config)?;
    let mut file = NamedTempFile::with_suffix(".csv")?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    file.flush()?;
    Ok(file)
}
