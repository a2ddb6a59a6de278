use orchidex_data_processing::schema::{ID_COLUMN, ORCHID_SCHEMA, columns};
use polars::prelude::*;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            // Same text as a polars Float64 -> String cast: `10.0`, not `10`
            Self::Real(value) => write!(f, "{value:?}"),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// One orchid taxon: its id plus every schema column, in schema order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrchidRecord {
    pub id: u64,
    values: Vec<Option<FieldValue>>,
}

impl OrchidRecord {
    /// Build a record from `(column, value)` pairs; unnamed columns stay null
    /// and names outside the schema are ignored.
    pub fn from_values<'a>(
        id: u64,
        values: impl IntoIterator<Item = (&'a str, FieldValue)>,
    ) -> Self {
        let mut record = Self {
            id,
            values: vec![None; ORCHID_SCHEMA.len()],
        };
        for (column, value) in values {
            if let Some(position) = column_position(column) {
                record.values[position] = Some(value);
            }
        }
        record
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        column_position(column).and_then(|position| self.values[position].as_ref())
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        if column == ID_COLUMN {
            return Some(self.id as f64);
        }
        self.get(column).and_then(FieldValue::as_f64)
    }

    /// The value rendered as text, whatever its type.
    pub fn display(&self, column: &str) -> Option<String> {
        if column == ID_COLUMN {
            return Some(self.id.to_string());
        }
        self.get(column).map(ToString::to_string)
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.text(columns::SCIENTIFIC_NAME)
    }

    pub fn genus(&self) -> Option<&str> {
        self.text(columns::GENUS)
    }

    pub fn common_names(&self) -> Option<&str> {
        self.text(columns::COMMON_NAMES)
    }

    pub fn flower_color(&self) -> Option<&str> {
        self.text(columns::FLOWER_COLOR)
    }

    /// Non-null columns in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        ORCHID_SCHEMA
            .iter()
            .zip(&self.values)
            .filter_map(|((name, _), value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    /// Convert every row of a store frame into records.
    pub(crate) fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let ids = df.column(ID_COLUMN)?.u64()?;
        let mut records: Vec<Self> = ids
            .into_iter()
            .map(|id| Self {
                id: id.unwrap_or_default(),
                values: Vec::with_capacity(ORCHID_SCHEMA.len()),
            })
            .collect();

        for (name, dtype) in &ORCHID_SCHEMA {
            let column = df.column(name.as_str())?;
            match dtype {
                DataType::Float64 => {
                    let values = column.f64()?;
                    for (record, value) in records.iter_mut().zip(values) {
                        record.values.push(value.map(FieldValue::Real));
                    }
                }
                DataType::Int64 => {
                    let values = column.i64()?;
                    for (record, value) in records.iter_mut().zip(values) {
                        record.values.push(value.map(FieldValue::Integer));
                    }
                }
                _ => {
                    let values = column.str()?;
                    for (record, value) in records.iter_mut().zip(values) {
                        record
                            .values
                            .push(value.map(|v| FieldValue::Text(v.to_string())));
                    }
                }
            }
        }
        Ok(records)
    }
}

fn column_position(column: &str) -> Option<usize> {
    ORCHID_SCHEMA
        .iter()
        .position(|(name, _)| name.as_str() == column)
}
