//! Record parsing over the full input under an established dialect.

use std::iter::Peekable;
use std::str::Chars;

use log::warn;

use crate::config::MalformedPolicy;
use crate::dialect::Dialect;
use crate::error::{ProfileError, Result};

/// One parsed record: an ordered sequence of raw field strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number where the record starts.
    pub line: usize,
    /// Field values with quoting, escaping, and leading-space handling applied.
    pub fields: Vec<String>,
}

/// Restartable reader producing parsed records from the full input.
///
/// Sniffing and statistics gathering are separate passes, so the reader can
/// be re-driven from the start of input any number of times via [`iter`].
///
/// [`iter`]: RecordReader::iter
#[derive(Debug)]
pub struct RecordReader<'a> {
    text: &'a str,
    dialect: &'a Dialect,
    policy: MalformedPolicy,
}

impl<'a> RecordReader<'a> {
    /// Create a reader over `text` using the given dialect and malformed-record
    /// policy.
    pub fn new(text: &'a str, dialect: &'a Dialect, policy: MalformedPolicy) -> Self {
        Self {
            text,
            dialect,
            policy,
        }
    }

    /// Start a fresh iteration from the beginning of the input.
    pub fn iter(&self) -> RecordIter<'a> {
        RecordIter {
            chars: self.text.chars().peekable(),
            dialect: self.dialect.clone(),
            line: 1,
        }
    }

    /// Parse every record, applying the configured malformed-record policy:
    /// with [`MalformedPolicy::Abort`] the first malformed record fails the
    /// whole run, with [`MalformedPolicy::Skip`] it is dropped and parsing
    /// continues.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for parsed in self.iter() {
            match parsed {
                Ok(record) => records.push(record),
                Err(err) => match self.policy {
                    MalformedPolicy::Abort => return Err(err),
                    MalformedPolicy::Skip => warn!("skipping malformed record: {err}"),
                },
            }
        }
        Ok(records)
    }
}

/// Iterator over parsed records. Blank lines outside quoted fields are
/// skipped; quoted fields may span lines.
pub struct RecordIter<'a> {
    chars: Peekable<Chars<'a>>,
    dialect: Dialect,
    line: usize,
}

impl Iterator for RecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let quote = self.dialect.quote_char();
        let delimiter = self.dialect.delimiter;
        let escape = self.dialect.escape;

        loop {
            self.chars.peek()?;

            let start_line = self.line;
            let mut fields: Vec<String> = Vec::new();
            let mut current = String::new();
            let mut in_quotes = false;
            let mut saw_content = false;

            loop {
                let Some(c) = self.chars.next() else {
                    // EOF inside a record
                    if in_quotes {
                        return Some(Err(ProfileError::MalformedRecord {
                            line: start_line,
                            reason: "unterminated quoted field".to_string(),
                        }));
                    }
                    if saw_content || !current.is_empty() || !fields.is_empty() {
                        fields.push(current);
                        return Some(Ok(Record {
                            line: start_line,
                            fields,
                        }));
                    }
                    return None;
                };

                if c == '\n' || c == '\r' {
                    if c == '\r' && self.chars.peek() == Some(&'\n') {
                        self.chars.next();
                    }
                    self.line += 1;
                    if in_quotes {
                        current.push('\n');
                        continue;
                    }
                    if !saw_content && current.is_empty() && fields.is_empty() {
                        // blank line, not a record
                        break;
                    }
                    fields.push(current);
                    return Some(Ok(Record {
                        line: start_line,
                        fields,
                    }));
                }

                if let Some(esc) = escape
                    && c == esc
                {
                    match self.chars.next() {
                        Some(escaped) => {
                            if escaped == '\n' {
                                self.line += 1;
                            }
                            current.push(escaped);
                            saw_content = true;
                        }
                        None => {
                            return Some(Err(ProfileError::MalformedRecord {
                                line: start_line,
                                reason: "dangling escape at end of input".to_string(),
                            }));
                        }
                    }
                    continue;
                }

                if let Some(q) = quote
                    && c == q
                {
                    if in_quotes {
                        if self.dialect.double_quote && self.chars.peek() == Some(&q) {
                            self.chars.next();
                            current.push(q);
                        } else {
                            in_quotes = false;
                        }
                    } else if current.is_empty() {
                        // opening quote only at field start; elsewhere literal
                        in_quotes = true;
                        saw_content = true;
                    } else {
                        current.push(q);
                    }
                    continue;
                }

                if c == delimiter && !in_quotes {
                    fields.push(std::mem::take(&mut current));
                    saw_content = true;
                    if self.dialect.skip_initial_space {
                        while self.chars.peek() == Some(&' ') {
                            self.chars.next();
                        }
                    }
                    continue;
                }

                current.push(c);
                saw_content = true;
            }
        }
    }
}
