//! Field type classification and the per-column inference state machine.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Final type verdict for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// Text value (fallback type).
    #[default]
    String,
    /// Whole number, possibly negative.
    Integer,
    /// Floating point number.
    Float,
    /// Date or date-time value.
    Timestamp,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl FieldType {
    /// Returns true if this type carries numeric statistics.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

/// Pattern for floating point numbers (requires a decimal point or exponent,
/// so plain integers do not match).
static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.\d*|\d*\.\d+|\d+[eE][-+]?\d+|(?:\d+\.\d*|\d*\.\d+)[eE][-+]?\d+)$")
        .expect("Invalid float pattern")
});

/// Pattern for ISO 8601 dates (YYYY-MM-DD).
static DATE_ISO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid ISO date pattern")
});

/// Pattern for US-style dates (MM/DD/YYYY or MM-DD-YYYY).
static DATE_US_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{2,4}$").expect("Invalid US date pattern")
});

/// Pattern for ISO 8601 datetimes (YYYY-MM-DDTHH:MM:SS with optional zone).
static DATETIME_ISO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}[T ]\d{1,2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("Invalid ISO datetime pattern")
});

/// Check for an integer using string parsing instead of regex.
/// This is a hot path - called for every cell.
/// Limit to 19 digits so every accepted value fits in i64.
#[inline]
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.len() <= 19 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Check for a float that is not also an integer.
#[inline]
pub fn is_float(s: &str) -> bool {
    FLOAT_PATTERN.is_match(s)
}

/// Check for a date or datetime value.
pub fn is_timestamp(s: &str) -> bool {
    DATETIME_ISO_PATTERN.is_match(s) || DATE_ISO_PATTERN.is_match(s) || DATE_US_PATTERN.is_match(s)
}

/// Returns true if the value parses as an integer or a float.
#[inline]
pub fn looks_numeric(s: &str) -> bool {
    let trimmed = s.trim();
    is_integer(trimmed) || is_float(trimmed)
}

/// Running type verdict for one column.
///
/// The verdict only ever weakens: integer evidence keeps or tightens toward
/// `Integer`, float evidence weakens integer columns to `Float`, and a value
/// that fits no other class demotes the column to `String` for the remainder
/// of the run. `String` is absorbing, so the final verdict is independent of
/// record order. Empty cells are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeGuess {
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Undetermined,
    Integer,
    Float,
    Timestamp,
    String,
}

impl TypeGuess {
    /// Create a fresh, undetermined guess.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw value into the running verdict.
    pub fn observe(&mut self, value: &str) {
        if self.state == State::String {
            return;
        }
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }

        self.state = match (self.state, classify(trimmed)) {
            (State::Undetermined, cell) => cell,
            (state, cell) if state == cell => state,
            (State::Integer, State::Float) | (State::Float, State::Integer) => State::Float,
            _ => State::String,
        };
    }

    /// Final verdict. A column that never saw a classifiable value is a
    /// string column.
    pub fn finish(&self) -> FieldType {
        match self.state {
            State::Undetermined | State::String => FieldType::String,
            State::Integer => FieldType::Integer,
            State::Float => FieldType::Float,
            State::Timestamp => FieldType::Timestamp,
        }
    }
}

fn classify(trimmed: &str) -> State {
    if is_integer(trimmed) {
        State::Integer
    } else if is_float(trimmed) {
        State::Float
    } else if is_timestamp(trimmed) {
        State::Timestamp
    } else {
        State::String
    }
}
