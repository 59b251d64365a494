//! csv-profiler: profile an unknown delimited text file
//!
//! Given raw text with no schema, the profiler infers the file's dialect
//! (delimiter, quote style, header presence), classifies each column's data
//! type, and computes descriptive statistics per column: numeric moments,
//! lengths, case shape, and value frequencies.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_profiler::Profiler;
//!
//! let profiler = Profiler::new();
//! let report = profiler.profile_path("data.csv").unwrap();
//!
//! println!("Delimiter: {}", report.file.dialect.delimiter);
//! println!("Records: {}", report.file.record_count);
//! for field in &report.fields {
//!     println!("{}: {}", field.name, field.inferred_type);
//! }
//! ```
//!
//! # How it works
//!
//! Profiling is two logical passes over the same input:
//!
//! 1. A bounded sample is sniffed: candidate delimiters are tried in priority
//!    order and scored by the variance of per-line field counts; quote style
//!    and header presence are inferred from the sample under the winner.
//! 2. The full input is re-read under the established dialect, fanning each
//!    record out to independent per-column accumulators; at end-of-stream
//!    the accumulators finalize into a read-only [`Report`].
//!
//! Callers that only need the dialect can stop after the first pass with
//! [`Profiler::sniff_text`] or [`Profiler::sniff_path`]. Explicit overrides
//! ([`Profiler::delimiter`], [`Profiler::quote`], [`Profiler::header`])
//! bypass the corresponding inference step entirely.

mod config;
mod dialect;
mod encoding;
mod error;
mod field_type;
mod profiler;
mod reader;
mod report;
mod sniffer;
mod stats;

pub use config::{MalformedPolicy, SampleSize};
pub use dialect::{Dialect, LineTerminator, Quote, Quoting};
pub use error::{ProfileError, Result};
pub use field_type::FieldType;
pub use profiler::Profiler;
pub use reader::{Record, RecordReader};
pub use report::{CaseClass, FieldReport, FileReport, FormatType, NumericSummary, Report, TopValues};

// Re-export for advanced usage
pub use encoding::{decode_to_string, is_utf8};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api() {
        let _profiler = Profiler::new();
        let _sample = SampleSize::Lines(100);
        let _policy = MalformedPolicy::Skip;
        let _quote = Quote::Some('"');
        let _type = FieldType::Integer;
    }

    #[test]
    fn test_profile_simple_csv() {
        let report = Profiler::new().profile_text("a,b,c\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(report.file.dialect.delimiter, ',');
        assert_eq!(report.file.field_count, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let mut profiler = Profiler::new();
        profiler
            .sample_size(SampleSize::Bytes(4096))
            .cardinality_cap(500)
            .top_values(5)
            .delimiter(';')
            .quote(Quote::None);
    }
}
