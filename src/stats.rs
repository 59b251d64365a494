//! Per-column streaming statistics.
//!
//! Each column owns one [`FieldAccumulator`]; no state crosses column
//! boundaries. Values are folded in a single ordered pass, and every derived
//! statistic (mean, variance, median, top values, case verdict) is computed
//! once at finalization. Numeric moments are streaming; the exact median
//! keeps the collected numeric values in memory, which bounds the supported
//! cardinality to what fits in RAM.

use foldhash::{HashMap, HashMapExt};
use log::debug;

use crate::field_type::{FieldType, TypeGuess, looks_numeric};
use crate::report::{CaseClass, FieldReport, NumericSummary, TopValues};

/// Streaming accumulator for one column.
#[derive(Debug)]
pub struct FieldAccumulator {
    field_number: usize,
    name: String,
    cardinality_cap: usize,

    count: u64,
    wrong_field_cnt: u64,
    guess: TypeGuess,

    sum: f64,
    sum_squares: f64,
    numeric_values: Vec<f64>,
    numeric_min: Option<f64>,
    numeric_max: Option<f64>,

    lex_min: Option<String>,
    lex_max: Option<String>,

    len_min: Option<u64>,
    len_max: u64,
    len_sum: u64,

    cases: CaseTally,

    freq: HashMap<String, ValueCount>,
    next_order: u64,
    overflowed: bool,
}

#[derive(Debug, Clone, Copy)]
struct ValueCount {
    count: u64,
    first_seen: u64,
}

impl FieldAccumulator {
    pub fn new(field_number: usize, name: String, cardinality_cap: usize) -> Self {
        Self {
            field_number,
            name,
            cardinality_cap,
            count: 0,
            wrong_field_cnt: 0,
            guess: TypeGuess::new(),
            sum: 0.0,
            sum_squares: 0.0,
            numeric_values: Vec::new(),
            numeric_min: None,
            numeric_max: None,
            lex_min: None,
            lex_max: None,
            len_min: None,
            len_max: 0,
            len_sum: 0,
            cases: CaseTally::default(),
            freq: HashMap::new(),
            next_order: 0,
            overflowed: false,
        }
    }

    /// Fold one raw value into the column state.
    pub fn observe(&mut self, value: &str) {
        self.count += 1;

        let len = value.chars().count() as u64;
        self.len_sum += len;
        self.len_min = Some(self.len_min.map_or(len, |m| m.min(len)));
        self.len_max = self.len_max.max(len);

        if self
            .lex_min
            .as_deref()
            .is_none_or(|current| value < current)
        {
            self.lex_min = Some(value.to_string());
        }
        if self
            .lex_max
            .as_deref()
            .is_none_or(|current| value > current)
        {
            self.lex_max = Some(value.to_string());
        }

        self.guess.observe(value);

        let trimmed = value.trim();
        if looks_numeric(trimmed)
            && let Ok(number) = trimmed.parse::<f64>()
        {
            self.sum += number;
            self.sum_squares += number * number;
            self.numeric_values.push(number);
            self.numeric_min = Some(self.numeric_min.map_or(number, |m| m.min(number)));
            self.numeric_max = Some(self.numeric_max.map_or(number, |m| m.max(number)));
        }

        self.cases.observe(value);

        if let Some(entry) = self.freq.get_mut(value) {
            entry.count += 1;
        } else if self.freq.len() < self.cardinality_cap {
            self.freq.insert(
                value.to_string(),
                ValueCount {
                    count: 1,
                    first_seen: self.next_order,
                },
            );
            self.next_order += 1;
        } else {
            if !self.overflowed {
                debug!(
                    "field {} exceeded the cardinality cap of {}; distinct counts degrade to lower bounds",
                    self.name, self.cardinality_cap
                );
            }
            self.overflowed = true;
        }
    }

    /// Count this column's record against the wrong-field-count tally.
    pub fn record_wrong_field(&mut self) {
        self.wrong_field_cnt += 1;
    }

    /// Compute every derived statistic and freeze the column into a report.
    pub fn finalize(self, top_n: usize, display_ceiling: usize) -> FieldReport {
        let inferred_type = self.guess.finish();
        let known_values = self.freq.len() as u64;
        let unique_values = self.freq.values().filter(|v| v.count == 1).count() as u64;

        let (min, max) = if inferred_type.is_numeric() {
            (
                self.numeric_min.map(format_number),
                self.numeric_max.map(format_number),
            )
        } else {
            (self.lex_min, self.lex_max)
        };

        let case = (inferred_type == FieldType::String).then(|| self.cases.verdict());

        let numeric = (inferred_type.is_numeric() && !self.numeric_values.is_empty())
            .then(|| numeric_summary(self.sum, self.sum_squares, self.numeric_values));

        let mean_length = if self.count == 0 {
            0.0
        } else {
            self.len_sum as f64 / self.count as f64
        };

        // A table in which nothing repeats carries no signal, so it collapses
        // to the sentinel just like a capped column does.
        let all_distinct = self.count > 1 && known_values == self.count;
        let top_values = if self.overflowed || all_distinct || known_values > display_ceiling as u64
        {
            TopValues::NotShown
        } else {
            let mut items: Vec<(String, ValueCount)> = self.freq.into_iter().collect();
            items.sort_by(|a, b| {
                b.1.count
                    .cmp(&a.1.count)
                    .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
            });
            items.truncate(top_n);
            TopValues::Values(
                items
                    .into_iter()
                    .map(|(value, vc)| (value, vc.count))
                    .collect(),
            )
        };

        FieldReport {
            field_number: self.field_number,
            name: self.name,
            inferred_type,
            known_values,
            unique_values,
            values_truncated: self.overflowed,
            wrong_field_cnt: self.wrong_field_cnt,
            min,
            max,
            case,
            min_length: self.len_min.unwrap_or(0),
            mean_length,
            max_length: self.len_max,
            numeric,
            top_values,
        }
    }
}

fn numeric_summary(sum: f64, sum_squares: f64, mut values: Vec<f64>) -> NumericSummary {
    let n = values.len() as f64;
    let mean = sum / n;
    // population variance: divide by n, not n - 1
    let variance = (sum_squares / n - mean * mean).max(0.0);

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    NumericSummary {
        mean,
        median,
        variance,
        std_dev: variance.sqrt(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Default)]
struct CaseTally {
    upper: u64,
    lower: u64,
    mixed: u64,
    unknown: u64,
}

impl CaseTally {
    fn observe(&mut self, value: &str) {
        match classify_case(value) {
            CaseClass::Upper => self.upper += 1,
            CaseClass::Lower => self.lower += 1,
            CaseClass::Mixed => self.mixed += 1,
            CaseClass::Unknown => self.unknown += 1,
        }
    }

    fn verdict(&self) -> CaseClass {
        if self.mixed > 0 || (self.upper > 0 && self.lower > 0) {
            CaseClass::Mixed
        } else if self.upper > 0 {
            CaseClass::Upper
        } else if self.lower > 0 {
            CaseClass::Lower
        } else {
            CaseClass::Unknown
        }
    }
}

/// Classify one value by the cased characters it contains. A value with no
/// cased characters (digits, punctuation, empty) is unknown.
fn classify_case(value: &str) -> CaseClass {
    let mut has_upper = false;
    let mut has_lower = false;
    for c in value.chars() {
        if c.is_uppercase() {
            has_upper = true;
        } else if c.is_lowercase() {
            has_lower = true;
        }
    }
    match (has_upper, has_lower) {
        (true, true) => CaseClass::Mixed,
        (true, false) => CaseClass::Upper,
        (false, true) => CaseClass::Lower,
        (false, false) => CaseClass::Unknown,
    }
}
