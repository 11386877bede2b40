use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::schema::Schema;

// ---------------------------------------------------------------------------
// Value – a single cell of a record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value after ingestion.
///
/// Missing or unparseable numeric cells are `Absent`, never `Number(0.0)`,
/// so invalid rows are not silently plotted at the origin.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Absent,
}

static ABSENT: Value = Value::Absent;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Absent => write!(f, "<absent>"),
        }
    }
}

impl Value {
    /// Finite numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Guess the type of a raw text cell.
    pub fn parse_cell(raw: &str) -> Value {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Absent;
        }
        if let Ok(v) = s.parse::<f64>() {
            if v.is_finite() {
                return Value::Number(v);
            }
        }
        match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(s.to_string()),
        }
    }
}

/// The single "equivalent to true" coercion used for condition flags:
/// numeric `1`, boolean `true`, and the strings `"1"` / `"true"`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Number(v) => *v == 1.0,
        Value::Bool(b) => *b,
        Value::Text(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        Value::Absent => false,
    }
}

// ---------------------------------------------------------------------------
// Categorical vocabularies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    /// Map the label variants seen in the wild onto the vocabulary.
    pub fn normalize(value: &Value) -> Option<Sex> {
        match value {
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "female" | "f" | "0" => Some(Sex::Female),
                "male" | "m" | "1" => Some(Sex::Male),
                _ => None,
            },
            Value::Number(v) if *v == 0.0 => Some(Sex::Female),
            Value::Number(v) if *v == 1.0 => Some(Sex::Male),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Survived,
    Died,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Survived, Outcome::Died];

    pub fn normalize(value: &Value) -> Option<Outcome> {
        match value {
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "survived" | "alive" | "0" => Some(Outcome::Survived),
                "died" | "dead" | "death" | "1" => Some(Outcome::Died),
                _ => None,
            },
            Value::Number(v) if *v == 0.0 => Some(Outcome::Survived),
            Value::Number(v) if *v == 1.0 => Some(Outcome::Died),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Survived => "Survived",
            Outcome::Died => "Died",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One dataset row after ingestion and type coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Value of a column; unknown columns read as `Absent`.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&ABSENT)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).as_f64()
    }

    /// Bring the record in line with the schema: every schema column is
    /// present, and numeric columns hold either a finite number or `Absent`.
    pub fn conform(mut self, schema: &Schema) -> Self {
        for field in schema.all_fields() {
            self.fields
                .entry(field.to_string())
                .or_insert(Value::Absent);
        }
        for field in &schema.numeric_fields {
            if let Some(slot) = self.fields.get_mut(field) {
                let coerced = match &*slot {
                    Value::Number(v) if v.is_finite() => Value::Number(*v),
                    Value::Text(s) => match s.trim().parse::<f64>() {
                        Ok(v) if v.is_finite() => Value::Number(v),
                        _ => Value::Absent,
                    },
                    _ => Value::Absent,
                };
                *slot = coerced;
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable dataset held after a successful load.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    /// Sorted union of column names across all records.
    pub column_names: Vec<String>,
}

impl RecordStore {
    /// Conform every raw row to the schema and index the column names.
    pub fn from_records(records: Vec<Record>, schema: &Schema) -> Self {
        let records: Vec<Record> = records.into_iter().map(|r| r.conform(schema)).collect();

        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            column_names_set.extend(rec.fields.keys().cloned());
        }

        RecordStore {
            records,
            column_names: column_names_set.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
