//! The finalized result structures handed to external formatters.
//!
//! Everything here is plain data: built once at the end of the streaming
//! pass, read-only afterward.

use std::fmt;

use crate::dialect::Dialect;
use crate::field_type::FieldType;

/// The complete profile of one input: file-level facts plus one
/// [`FieldReport`] per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub file: FileReport,
    pub fields: Vec<FieldReport>,
}

/// File-level analysis results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Number of data records (the header row, when present, is not a data
    /// record).
    pub record_count: u64,
    /// Established number of columns.
    pub field_count: usize,
    /// The dialect the run was parsed under.
    pub dialect: Dialect,
    /// Input format tag.
    pub format_type: FormatType,
}

/// Input format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatType {
    #[default]
    Csv,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::Csv => write!(f, "csv"),
        }
    }
}

/// Per-column analysis results.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    /// 0-based column position.
    pub field_number: usize,
    /// Header name, or a generated `field_N` name for headerless input.
    pub name: String,
    /// Final type verdict.
    pub inferred_type: FieldType,
    /// Distinct values observed. A lower bound when `values_truncated`.
    pub known_values: u64,
    /// Distinct values observed exactly once. A lower bound when
    /// `values_truncated`.
    pub unique_values: u64,
    /// Set when distinct-value tracking hit its cardinality cap, making the
    /// distinct counts lower-bound estimates.
    pub values_truncated: bool,
    /// Records whose column count disagreed with the established field count.
    pub wrong_field_cnt: u64,
    /// Smallest value, compared numerically for numeric fields and lexically
    /// otherwise.
    pub min: Option<String>,
    /// Largest value, same comparison rules as `min`.
    pub max: Option<String>,
    /// Case shape; only set for string fields.
    pub case: Option<CaseClass>,
    pub min_length: u64,
    pub mean_length: f64,
    pub max_length: u64,
    /// Numeric moments; only set for integer and float fields.
    pub numeric: Option<NumericSummary>,
    pub top_values: TopValues,
}

/// Numeric moments for integer and float fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    /// Exact middle element, or the average of the two middle elements for
    /// even counts.
    pub median: f64,
    /// Population variance (divide by n).
    pub variance: f64,
    /// `sqrt(variance)`.
    pub std_dev: f64,
}

/// Case shape of a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseClass {
    Upper,
    Lower,
    Mixed,
    Unknown,
}

impl fmt::Display for CaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseClass::Upper => write!(f, "upper"),
            CaseClass::Lower => write!(f, "lower"),
            CaseClass::Mixed => write!(f, "mixed"),
            CaseClass::Unknown => write!(f, "unknown"),
        }
    }
}

/// Most frequent values for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopValues {
    /// `(value, occurrence count)` pairs, ordered by count descending with
    /// ties broken by first occurrence.
    Values(Vec<(String, u64)>),
    /// The table was suppressed: the column blew its cardinality cap or its
    /// distinct count exceeded the display ceiling.
    NotShown,
}

impl TopValues {
    /// Returns the table entries, or `None` for the sentinel.
    pub fn entries(&self) -> Option<&[(String, u64)]> {
        match self {
            TopValues::Values(entries) => Some(entries),
            TopValues::NotShown => None,
        }
    }
}
