//! Dialect inference from a bounded sample of raw lines.
//!
//! For each candidate delimiter in priority order, every sample line is split
//! and the variance of per-line field counts is computed. A candidate is
//! consistent when that variance is at or below the configured tolerance
//! across enough lines; the first consistent, non-degenerate candidate in the
//! priority list wins. Quote style, doubled-quote escaping, and header
//! presence are then inferred from the sample under the chosen delimiter.

use foldhash::{HashMap, HashMapExt};
use log::debug;

use crate::config::MalformedPolicy;
use crate::dialect::{Dialect, LineTerminator, Quote, Quoting};
use crate::error::{ProfileError, Result};
use crate::field_type::looks_numeric;
use crate::reader::RecordReader;

/// Outcome of sniffing: the dialect plus the field count it establishes.
#[derive(Debug, Clone)]
pub struct SniffResult {
    /// The inferred (or overridden) dialect.
    pub dialect: Dialect,
    /// Modal field count across the sample under the chosen delimiter.
    pub field_count: usize,
}

/// Explicit dialect settings that bypass the corresponding inference step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub delimiter: Option<char>,
    pub quote: Option<Quote>,
    pub header: Option<bool>,
}

/// Per-candidate consistency score.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    /// The candidate delimiter.
    pub delimiter: char,
    /// Population variance of per-line field counts.
    pub variance: f64,
    /// Number of sample lines scored.
    pub lines: usize,
    /// Modal field count (ties broken toward the larger count).
    pub field_count: usize,
}

impl CandidateScore {
    /// A candidate is consistent when its field counts barely vary across
    /// enough lines and it splits lines into more than one field.
    pub fn is_consistent(&self, tolerance: f64, min_lines: usize) -> bool {
        self.lines >= min_lines && self.variance <= tolerance && self.field_count >= 2
    }
}

/// Sniff a dialect from the sample.
///
/// `truncated` marks a sample cut mid-line by a byte limit, in which case the
/// trailing partial line is excluded from scoring.
pub fn sniff(
    sample: &str,
    candidates: &[char],
    tolerance: f64,
    min_lines: usize,
    truncated: bool,
    overrides: &Overrides,
) -> Result<SniffResult> {
    let lines = sample_lines(sample, truncated);
    if lines.is_empty() {
        return Err(ProfileError::EmptyData);
    }

    let score = match overrides.delimiter {
        Some(delimiter) => score_candidate(&lines, delimiter),
        None => choose_delimiter(&lines, candidates, tolerance, min_lines)?,
    };
    debug!(
        "delimiter {:?}: variance {:.4} over {} line(s), {} field(s)",
        score.delimiter, score.variance, score.lines, score.field_count
    );

    let shape = match overrides.quote {
        Some(Quote::None) => QuoteShape {
            quote: Quote::Some('"'),
            quoting: Quoting::None,
            double_quote: false,
        },
        Some(Quote::Some(q)) => detect_quote_shape(&lines, score.delimiter, Some(q)),
        None => detect_quote_shape(&lines, score.delimiter, None),
    };

    let mut dialect = Dialect {
        delimiter: score.delimiter,
        quote: shape.quote,
        quoting: shape.quoting,
        escape: detect_escape(sample, score.delimiter, shape.quote.char()),
        double_quote: shape.double_quote,
        skip_initial_space: detect_skip_initial_space(&lines, score.delimiter),
        line_terminator: LineTerminator::detect(sample),
        has_header: false,
    };

    dialect.has_header = match overrides.header {
        Some(flag) => flag,
        None => detect_header(sample, &dialect),
    };

    Ok(SniffResult {
        dialect,
        field_count: score.field_count,
    })
}

fn sample_lines(sample: &str, truncated: bool) -> Vec<&str> {
    let mut lines: Vec<&str> = sample
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .collect();
    if truncated && !sample.ends_with(['\n', '\r']) && lines.len() > 1 {
        lines.pop();
    }
    lines
}

/// Walk the priority list and return the first consistent candidate.
///
/// Priority order is the tie-break: a comma that is consistent wins even if a
/// later candidate would score better.
pub fn choose_delimiter(
    lines: &[&str],
    candidates: &[char],
    tolerance: f64,
    min_lines: usize,
) -> Result<CandidateScore> {
    for &delimiter in candidates {
        let score = score_candidate(lines, delimiter);
        if score.is_consistent(tolerance, min_lines) {
            return Ok(score);
        }
    }
    Err(ProfileError::AmbiguousDialect(format!(
        "no candidate delimiter {candidates:?} splits the sample into a consistent field count"
    )))
}

/// Score one candidate delimiter across the sample lines.
pub fn score_candidate(lines: &[&str], delimiter: char) -> CandidateScore {
    let counts: Vec<usize> = lines
        .iter()
        .map(|line| field_count(line, delimiter))
        .collect();

    CandidateScore {
        delimiter,
        variance: variance(&counts),
        lines: counts.len(),
        field_count: modal_count(&counts),
    }
}

/// Count fields in one line, treating double-quoted stretches as opaque so an
/// embedded delimiter does not split.
fn field_count(line: &str, delimiter: char) -> usize {
    let mut count = 1;
    let mut in_quotes = false;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

fn variance(counts: &[usize]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<usize>() as f64 / n;
    counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n
}

/// Modal count with a deterministic tie-break toward the larger count, so
/// results do not depend on map iteration order.
fn modal_count(counts: &[usize]) -> usize {
    let mut freq: HashMap<usize, usize> = HashMap::with_capacity(counts.len());
    for &c in counts {
        *freq.entry(c).or_insert(0) += 1;
    }
    freq.into_iter()
        .max_by(|(ca, fa), (cb, fb)| fa.cmp(fb).then_with(|| ca.cmp(cb)))
        .map_or(0, |(c, _)| c)
}

struct QuoteShape {
    quote: Quote,
    quoting: Quoting,
    double_quote: bool,
}

/// Infer quote character and quoting style by scanning raw sample fields for
/// leading/trailing quotes and doubled-quote sequences.
fn detect_quote_shape(lines: &[&str], delimiter: char, forced: Option<char>) -> QuoteShape {
    // Fast path: no quote characters anywhere in the sample.
    let has_any = lines.iter().any(|line| {
        let bytes = line.as_bytes();
        bytecount::count(bytes, b'"') > 0 || bytecount::count(bytes, b'\'') > 0
    });
    if !has_any && forced.is_none() {
        return QuoteShape {
            quote: Quote::Some('"'),
            quoting: Quoting::None,
            double_quote: false,
        };
    }

    let mut tally_double = QuoteTally::default();
    let mut tally_single = QuoteTally::default();
    for line in lines {
        tally_double.scan_line(line, delimiter, '"');
        tally_single.scan_line(line, delimiter, '\'');
    }

    let (quote_char, tally) = match forced {
        Some('\'') => ('\'', tally_single),
        Some(q) => (q, tally_double),
        None if tally_single.quoted > tally_double.quoted => ('\'', tally_single),
        None => ('"', tally_double),
    };

    if tally.quoted == 0 {
        // a forced quote character stays in effect even when the sample
        // happens to contain no cleanly quoted field
        let quoting = if forced.is_some() {
            Quoting::Minimal
        } else {
            Quoting::None
        };
        return QuoteShape {
            quote: Quote::Some(quote_char),
            quoting,
            double_quote: false,
        };
    }

    let quoting = if tally.unquoted == 0 {
        Quoting::All
    } else if tally.unquoted_nonnumeric == 0 && tally.quoted_numeric == 0 {
        Quoting::NonNumeric
    } else {
        Quoting::Minimal
    };

    QuoteShape {
        quote: Quote::Some(quote_char),
        quoting,
        double_quote: tally.doubled,
    }
}

#[derive(Default)]
struct QuoteTally {
    quoted: usize,
    quoted_numeric: usize,
    unquoted: usize,
    unquoted_nonnumeric: usize,
    doubled: bool,
}

impl QuoteTally {
    fn scan_line(&mut self, line: &str, delimiter: char, quote: char) {
        for raw in split_raw(line, delimiter, quote) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let chars: Vec<char> = trimmed.chars().collect();
            if chars.len() >= 2 && chars[0] == quote && chars[chars.len() - 1] == quote {
                self.quoted += 1;
                let inner = &trimmed[quote.len_utf8()..trimmed.len() - quote.len_utf8()];
                if looks_numeric(inner) {
                    self.quoted_numeric += 1;
                }
                let escaped: String = [quote, quote].iter().collect();
                if inner.contains(&escaped) {
                    self.doubled = true;
                }
            } else {
                self.unquoted += 1;
                if !looks_numeric(trimmed) {
                    self.unquoted_nonnumeric += 1;
                }
            }
        }
    }
}

/// Split a line on the delimiter without stripping quotes, so the caller can
/// inspect the raw field shape.
fn split_raw(line: &str, delimiter: char, quote: char) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (idx, c) in line.char_indices() {
        if c == quote {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            fields.push(&line[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Report a backslash escape only when one immediately precedes a quote or
/// delimiter somewhere in the sample.
fn detect_escape(sample: &str, delimiter: char, quote: Option<char>) -> Option<char> {
    let mut chars = sample.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == delimiter || Some(next) == quote)
        {
            return Some('\\');
        }
    }
    None
}

/// True only when every field after the first starts with a space across the
/// whole sample.
fn detect_skip_initial_space(lines: &[&str], delimiter: char) -> bool {
    let mut interior = 0;
    for line in lines {
        for (idx, raw) in split_raw(line, delimiter, '"').iter().enumerate() {
            if idx == 0 {
                continue;
            }
            interior += 1;
            if !raw.starts_with(' ') {
                return false;
            }
        }
    }
    interior > 0
}

/// Header detection: a header is declared when any column's first-row cell is
/// non-numeric while the later cells in that position are predominantly
/// numeric. A single column triggering this is sufficient.
fn detect_header(sample: &str, dialect: &Dialect) -> bool {
    let reader = RecordReader::new(sample, dialect, MalformedPolicy::Skip);
    let records = match reader.read_all() {
        Ok(records) => records,
        Err(_) => return false,
    };
    if records.len() < 2 {
        return false;
    }

    let first = &records[0].fields;
    for (col, cell) in first.iter().enumerate() {
        if cell.trim().is_empty() || looks_numeric(cell) {
            continue;
        }
        let mut seen = 0usize;
        let mut numeric = 0usize;
        for record in &records[1..] {
            if let Some(value) = record.fields.get(col) {
                if value.trim().is_empty() {
                    continue;
                }
                seen += 1;
                if looks_numeric(value) {
                    numeric += 1;
                }
            }
        }
        if seen > 0 && numeric * 2 > seen {
            return true;
        }
    }
    false
}
