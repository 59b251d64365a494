/// Sample size configuration for sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample a specific number of lines.
    Lines(usize),
    /// Sample a specific number of bytes.
    Bytes(usize),
    /// Use the entire input as the sample.
    ///
    /// # Warning
    ///
    /// For large inputs prefer [`SampleSize::Lines`] or [`SampleSize::Bytes`]
    /// with a reasonable limit; sniffing never needs the whole file.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        // 100 lines is enough signal for most files
        SampleSize::Lines(100)
    }
}

/// Ceiling on sample bytes when sampling by line count, so a single enormous
/// line cannot drag the whole file into the sniffing sample.
pub const SAMPLE_BYTE_CEILING: usize = 1 << 20;

impl SampleSize {
    /// Extract the sniffing sample from the start of `text`.
    ///
    /// For [`SampleSize::Lines`], stops at the line count or at
    /// [`SAMPLE_BYTE_CEILING`] bytes, whichever comes first.
    pub fn take<'a>(&self, text: &'a str) -> &'a str {
        match self {
            SampleSize::All => text,
            SampleSize::Bytes(n) => truncate_at_char_boundary(text, *n),
            SampleSize::Lines(n) => {
                let capped = truncate_at_char_boundary(text, SAMPLE_BYTE_CEILING);
                let mut seen = 0;
                for (idx, b) in capped.bytes().enumerate() {
                    if b == b'\n' {
                        seen += 1;
                        if seen >= *n {
                            return &capped[..=idx];
                        }
                    }
                }
                capped
            }
        }
    }
}

fn truncate_at_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// What to do when a record cannot be parsed under the established dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the entire run with a `MalformedRecord` error.
    #[default]
    Abort,
    /// Drop the affected record and continue with the rest of the input.
    Skip,
}

/// Candidate delimiters in priority order. When more than one candidate is
/// consistent across the sample, the earliest entry wins.
pub const DELIMITER_CANDIDATES: &[char] = &[',', '|', '\t', ';', ':', '^', '~'];

/// Default maximum number of distinct values tracked exactly per field.
pub const DEFAULT_CARDINALITY_CAP: usize = 10_000;

/// Default number of entries emitted in a top-values table.
pub const DEFAULT_TOP_N: usize = 20;

/// Default ceiling on distinct values before the top-values table is
/// suppressed in favor of the not-shown sentinel.
pub const DEFAULT_DISPLAY_CEILING: usize = 1_000;

/// Default minimum number of sample lines a delimiter must be consistent
/// across before it is accepted.
pub const DEFAULT_MIN_CONSISTENT_LINES: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_by_lines() {
        let text = "a,b\nc,d\ne,f\ng,h\n";
        assert_eq!(SampleSize::Lines(2).take(text), "a,b\nc,d\n");
        assert_eq!(SampleSize::Lines(100).take(text), text);
    }

    #[test]
    fn test_sample_by_bytes_respects_char_boundary() {
        let text = "héllo,world\n";
        let sample = SampleSize::Bytes(2).take(text);
        assert_eq!(sample, "h");
    }

    #[test]
    fn test_sample_all() {
        let text = "a,b\nc,d\n";
        assert_eq!(SampleSize::All.take(text), text);
    }
}
