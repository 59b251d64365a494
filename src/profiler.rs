//! The profiling run: sniff, stream, finalize.
//!
//! One [`Profiler`] value holds the run configuration; each `profile_*` call
//! is an independent run owning its own dialect, per-column accumulators, and
//! report. Ingest is a single ordered pass; per-column finalization is
//! independent and runs in parallel.

use std::fs;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;

use crate::config::{
    DEFAULT_CARDINALITY_CAP, DEFAULT_DISPLAY_CEILING, DEFAULT_MIN_CONSISTENT_LINES, DEFAULT_TOP_N,
    DELIMITER_CANDIDATES, MalformedPolicy, SampleSize,
};
use crate::dialect::{Dialect, Quote};
use crate::encoding::decode_to_string;
use crate::error::{ProfileError, Result};
use crate::reader::{Record, RecordReader};
use crate::report::{FileReport, FormatType, Report};
use crate::sniffer::{self, Overrides, SniffResult};
use crate::stats::FieldAccumulator;

/// Delimited-file profiler.
///
/// # Example
///
/// ```no_run
/// use csv_profiler::{Profiler, SampleSize};
///
/// let mut profiler = Profiler::new();
/// profiler.sample_size(SampleSize::Lines(50)).top_values(10);
///
/// let report = profiler.profile_path("data.csv").unwrap();
/// println!("Delimiter: {}", report.file.dialect.delimiter);
/// for field in &report.fields {
///     println!("{}: {}", field.name, field.inferred_type);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Profiler {
    sample_size: SampleSize,
    candidates: Vec<char>,
    consistency_tolerance: f64,
    min_consistent_lines: usize,
    cardinality_cap: usize,
    top_n: usize,
    display_ceiling: usize,
    malformed_policy: MalformedPolicy,
    overrides: Overrides,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            candidates: DELIMITER_CANDIDATES.to_vec(),
            consistency_tolerance: 0.0,
            min_consistent_lines: DEFAULT_MIN_CONSISTENT_LINES,
            cardinality_cap: DEFAULT_CARDINALITY_CAP,
            top_n: DEFAULT_TOP_N,
            display_ceiling: DEFAULT_DISPLAY_CEILING,
            malformed_policy: MalformedPolicy::default(),
            overrides: Overrides::default(),
        }
    }

    /// Set the sample size for sniffing.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Replace the candidate delimiter priority list.
    pub fn delimiter_candidates(&mut self, candidates: Vec<char>) -> &mut Self {
        self.candidates = candidates;
        self
    }

    /// Set the field-count variance a candidate delimiter may show and still
    /// count as consistent.
    pub fn consistency_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.consistency_tolerance = tolerance;
        self
    }

    /// Set the minimum number of sample lines a candidate must cover.
    pub fn min_consistent_lines(&mut self, lines: usize) -> &mut Self {
        self.min_consistent_lines = lines;
        self
    }

    /// Set the maximum number of distinct values tracked exactly per field.
    pub fn cardinality_cap(&mut self, cap: usize) -> &mut Self {
        self.cardinality_cap = cap;
        self
    }

    /// Set how many entries a top-values table may hold.
    pub fn top_values(&mut self, top_n: usize) -> &mut Self {
        self.top_n = top_n;
        self
    }

    /// Set the distinct-value ceiling above which top-values tables are
    /// suppressed.
    pub fn display_ceiling(&mut self, ceiling: usize) -> &mut Self {
        self.display_ceiling = ceiling;
        self
    }

    /// Set the malformed-record policy.
    pub fn malformed_policy(&mut self, policy: MalformedPolicy) -> &mut Self {
        self.malformed_policy = policy;
        self
    }

    /// Force a specific delimiter (skip delimiter detection).
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.overrides.delimiter = Some(delimiter);
        self
    }

    /// Force a specific quote configuration.
    pub fn quote(&mut self, quote: Quote) -> &mut Self {
        self.overrides.quote = Some(quote);
        self
    }

    /// Force header presence instead of detecting it.
    pub fn header(&mut self, has_header: bool) -> &mut Self {
        self.overrides.header = Some(has_header);
        self
    }

    /// Sniff the dialect only, without running the statistics pass.
    pub fn sniff_text(&self, text: &str) -> Result<Dialect> {
        self.sniff_result(text).map(|result| result.dialect)
    }

    /// Sniff a file's dialect only.
    pub fn sniff_path<P: AsRef<Path>>(&self, path: P) -> Result<Dialect> {
        let data = fs::read(path.as_ref())?;
        let text = decode_to_string(&data)?;
        self.sniff_text(&text)
    }

    /// Profile decoded text: sniff, stream every record, finalize.
    pub fn profile_text(&self, text: &str) -> Result<Report> {
        let sniffed = self.sniff_result(text)?;
        let dialect = sniffed.dialect.clone();

        let reader = RecordReader::new(text, &dialect, self.malformed_policy);
        let mut records = reader.iter();

        let (names, field_count) = if dialect.has_header {
            let header = loop {
                match records.next() {
                    Some(Ok(record)) => break record,
                    Some(Err(err)) => match self.malformed_policy {
                        MalformedPolicy::Abort => return Err(err),
                        MalformedPolicy::Skip => warn!("skipping malformed record: {err}"),
                    },
                    None => return Err(ProfileError::EmptyData),
                }
            };
            (header.fields.clone(), header.fields.len())
        } else {
            let count = sniffed.field_count;
            ((0..count).map(|i| format!("field_{i}")).collect(), count)
        };

        let mut accumulators: Vec<FieldAccumulator> = names
            .into_iter()
            .enumerate()
            .map(|(number, name)| FieldAccumulator::new(number, name, self.cardinality_cap))
            .collect();

        let mut record_count = 0u64;
        for parsed in records {
            let record = match parsed {
                Ok(record) => record,
                Err(err) => match self.malformed_policy {
                    MalformedPolicy::Abort => return Err(err),
                    MalformedPolicy::Skip => {
                        warn!("skipping malformed record: {err}");
                        continue;
                    }
                },
            };
            record_count += 1;
            self.ingest(&record, field_count, &mut accumulators);
        }

        info!(
            "profiled {record_count} record(s) across {field_count} field(s) \
             with delimiter {:?}",
            dialect.delimiter
        );

        let top_n = self.top_n;
        let display_ceiling = self.display_ceiling;
        let fields = accumulators
            .into_par_iter()
            .map(|acc| acc.finalize(top_n, display_ceiling))
            .collect();

        Ok(Report {
            file: FileReport {
                record_count,
                field_count,
                dialect,
                format_type: FormatType::Csv,
            },
            fields,
        })
    }

    /// Profile raw bytes, decoding them first.
    pub fn profile_bytes(&self, data: &[u8]) -> Result<Report> {
        let text = decode_to_string(data)?;
        self.profile_text(&text)
    }

    /// Profile data from a reader.
    pub fn profile_reader<R: Read>(&self, mut reader: R) -> Result<Report> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.profile_bytes(&data)
    }

    /// Profile a file at the given path.
    pub fn profile_path<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let data = fs::read(path.as_ref())?;
        self.profile_bytes(&data)
    }

    fn sniff_result(&self, text: &str) -> Result<SniffResult> {
        if text.is_empty() {
            return Err(ProfileError::EmptyData);
        }
        if self.candidates.is_empty() && self.overrides.delimiter.is_none() {
            return Err(ProfileError::InvalidConfig(
                "delimiter candidate list is empty and no delimiter override was given".to_string(),
            ));
        }
        let sample = self.sample_size.take(text);
        sniffer::sniff(
            sample,
            &self.candidates,
            self.consistency_tolerance,
            self.min_consistent_lines,
            sample.len() < text.len(),
            &self.overrides,
        )
    }

    /// Fan one record out to the per-column accumulators. A record whose
    /// width disagrees with the established field count is tallied against
    /// every column; its missing columns feed nothing and its excess columns
    /// are discarded.
    fn ingest(&self, record: &Record, field_count: usize, accumulators: &mut [FieldAccumulator]) {
        if record.fields.len() != field_count {
            warn!(
                "record at line {} has {} field(s), expected {field_count}",
                record.line,
                record.fields.len()
            );
            for acc in accumulators.iter_mut() {
                acc.record_wrong_field();
            }
        }
        for (value, acc) in record.fields.iter().zip(accumulators.iter_mut()) {
            acc.observe(value);
        }
    }
}
