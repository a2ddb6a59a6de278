//! The fixed orchid record schema.
//!
//! Every processed frame carries exactly these columns, in this order, plus the
//! `id` column assigned by the record store at load time.

use polars::prelude::*;

/// Name of the auto-assigned record identifier column.
pub const ID_COLUMN: &str = "id";

/// Column name used by the source CSV for the taxonomic order.
pub const SOURCE_ORDER_COLUMN: &str = "Order";

/// Column names referenced by the query engine.
pub mod columns {
    pub const SPECIES_KEY: &str = "Species_Key";
    pub const SCIENTIFIC_NAME: &str = "Scientific_Name";
    pub const GENUS: &str = "Genus";
    pub const ORDER_NAME: &str = "Order_Name";
    pub const GROWTH_HABIT: &str = "Growth_Habit";
    pub const FLOWER_COLOR: &str = "Flower_Color";
    pub const PETAL_SHAPE: &str = "Petal_Shape";
    pub const LIP_COLOR: &str = "Lip_Color";
    pub const FRAGRANCE: &str = "Fragrance";
    pub const FRAGRANCE_DESCRIPTION: &str = "Fragrance_Description";
    pub const BLOOMING_SEASON: &str = "Blooming_Season";
    pub const TEMPERATURE_MIN_C: &str = "Temperature_Min_C";
    pub const TEMPERATURE_MAX_C: &str = "Temperature_Max_C";
    pub const TEMPERATURE_PREFERENCE: &str = "Temperature_Preference";
    pub const NATIVE_HABITAT: &str = "Native_Habitat";
    pub const NATIVE_REGIONS: &str = "Native_Regions";
    pub const HORTICULTURAL_DIFFICULTY: &str = "Horticultural_Difficulty";
    pub const HORTICULTURAL_NOTES: &str = "Horticultural_Notes";
    pub const SPECIAL_FEATURES: &str = "Special_Features";
    pub const COMMON_NAMES: &str = "Common_Names";
}

const fn text(name: &'static str) -> (PlSmallStr, DataType) {
    (PlSmallStr::from_static(name), DataType::String)
}

const fn real(name: &'static str) -> (PlSmallStr, DataType) {
    (PlSmallStr::from_static(name), DataType::Float64)
}

const fn integer(name: &'static str) -> (PlSmallStr, DataType) {
    (PlSmallStr::from_static(name), DataType::Int64)
}

pub static ORCHID_SCHEMA: [(PlSmallStr, DataType); 69] = [
    integer("Species_Key"),
    text("Scientific_Name"),
    text("Canonical_Name"),
    text("Genus"),
    text("Species_Epithet"),
    text("Author"),
    text("Taxonomic_Status"),
    text("Kingdom"),
    text("Family"),
    text("Subfamily"),
    text("Order_Name"),
    text("Growth_Habit"),
    text("Flower_Size_cm"),
    text("Flower_Color"),
    text("Petal_Shape"),
    text("Petal_Count"),
    text("Lip_Shape"),
    text("Lip_Color"),
    text("Column_Structure"),
    text("Fragrance"),
    text("Fragrance_Description"),
    text("Blooming_Season"),
    text("Bloom_Duration_Weeks"),
    text("Flowers_Per_Spike"),
    text("Spike_Length_cm"),
    text("Light_Requirement_FC"),
    text("Light_Description"),
    real("Temperature_Min_C"),
    real("Temperature_Max_C"),
    text("Temperature_Preference"),
    integer("Humidity_Min_Percent"),
    integer("Humidity_Max_Percent"),
    text("Watering_Frequency"),
    text("Fertilizer_Requirement"),
    text("Potting_Media"),
    text("Pseudobulb"),
    text("Pseudobulb_Shape"),
    text("Stem_Type"),
    text("Stem_Length_cm"),
    text("Leaf_Type"),
    text("Leaf_Length_cm"),
    text("Leaf_Color"),
    text("Leaf_Arrangement"),
    text("Root_Type"),
    text("Root_Color"),
    text("Pollination_Type"),
    text("Pollination_Mechanism"),
    text("Seed_Type"),
    text("Propagation_Method"),
    text("Native_Habitat"),
    text("Native_Regions"),
    integer("Elevation_Min_m"),
    integer("Elevation_Max_m"),
    text("Climate_Type"),
    text("Rainfall_Requirement"),
    text("Air_Movement"),
    text("Mycorrhizal_Association"),
    text("Conservation_Status"),
    text("Threatened_Level"),
    text("Horticultural_Difficulty"),
    text("Horticultural_Notes"),
    text("Commercial_Importance"),
    text("Breeding_Potential"),
    text("Disease_Susceptibility"),
    text("Pest_Susceptibility"),
    text("Special_Features"),
    text("Cultural_Significance"),
    text("Common_Names"),
    text("Etymology"),
];

/// Columns covered by the full-text index.
pub const FULL_TEXT_COLUMNS: [&str; 13] = [
    columns::SCIENTIFIC_NAME,
    columns::GENUS,
    columns::FLOWER_COLOR,
    columns::PETAL_SHAPE,
    columns::LIP_COLOR,
    columns::FRAGRANCE_DESCRIPTION,
    columns::BLOOMING_SEASON,
    columns::TEMPERATURE_PREFERENCE,
    columns::NATIVE_HABITAT,
    columns::NATIVE_REGIONS,
    columns::SPECIAL_FEATURES,
    columns::COMMON_NAMES,
    columns::HORTICULTURAL_NOTES,
];

/// The schema as a polars [`Schema`], without the `id` column.
pub fn orchid_schema() -> Schema {
    Schema::from_iter(ORCHID_SCHEMA.iter().cloned())
}

/// Look up the declared type of a schema column.
pub fn column_dtype(name: &str) -> Option<&'static DataType> {
    ORCHID_SCHEMA
        .iter()
        .find(|(column, _)| column.as_str() == name)
        .map(|(_, dtype)| dtype)
}

pub fn is_known_column(name: &str) -> bool {
    name == ID_COLUMN || column_dtype(name).is_some()
}

/// Map a source header to its schema name. `Order` collides with a reserved
/// word in SQL-backed stores and is stored as `Order_Name`.
pub fn canonical_column_name(source: &str) -> &str {
    if source == SOURCE_ORDER_COLUMN {
        columns::ORDER_NAME
    } else {
        source
    }
}
