use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// A single table cell after numeric coercion.
// Serialises as the bare JSON value (`null`, `43`, `44.4`, `"A+"`), so a
// stored snapshot reads back into the same variants it was written from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Absent,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    // Empty text is absent, all-digit text is an integer, decimal text is a
    // float, anything else stays text. The checks run in that order.
    pub fn coerce(text: &str) -> CellValue {
        if text.is_empty() {
            return CellValue::Absent;
        }
        if text.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(value) = text.parse::<i64>() {
                return CellValue::Integer(value);
            }
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Float(value),
            _ => CellValue::Text(text.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Absent => Ok(()),
            CellValue::Integer(value) => write!(f, "{}", value),
            // Debug keeps the decimal point on whole floats ("44.0"), which
            // coerces back to a float instead of an integer.
            CellValue::Float(value) => write!(f, "{:?}", value),
            CellValue::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Course {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub credits: CellValue,
    #[serde(default)]
    pub graded: CellValue,
    #[serde(default)]
    pub grade: CellValue,
    #[serde(default)]
    pub gp: CellValue,
    #[serde(default)]
    pub percent: CellValue,
    #[serde(default)]
    pub credit_points: CellValue,
    #[serde(default)]
    pub gpa: CellValue,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

// The aggregate row closing a semester. Always machine formatted, so the
// numeric fields are plain numbers rather than coerced cells.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SemesterTotal {
    pub credits: i64,
    pub graded: i64,
    pub grade: Option<String>,
    pub gp: f64,
    pub percent: f64,
    pub credit_points: f64,
    pub gpa: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Semester {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total: Option<SemesterTotal>,
}

impl Semester {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.total.is_none()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.categories.iter().flat_map(|category| category.courses.iter())
    }
}

// One academic level: always exactly two semester slots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transcript {
    pub level: u32,
    #[serde(default)]
    pub first_semester: Semester,
    #[serde(default)]
    pub second_semester: Semester,
}

impl Transcript {
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.first_semester.courses().chain(self.second_semester.courses())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDateTime,
    pub transcripts: Vec<Transcript>,
}

impl Snapshot {
    pub fn new(date: NaiveDateTime, transcripts: Vec<Transcript>) -> Self {
        Snapshot { date, transcripts }
    }

    // A snapshot with no transcripts, standing in for a missing store.
    pub fn empty() -> Self {
        Snapshot::new(NaiveDateTime::default(), Vec::new())
    }
}
