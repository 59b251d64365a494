//! csv-profiler CLI - delimited-file profiler

use clap::Parser;
use csv_profiler::{
    FieldReport, MalformedPolicy, Profiler, Quote, Report, SampleSize, TopValues,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Delimited-file profiler.
///
/// Infers the dialect (delimiter, quote style, header presence) of each input
/// file, classifies every column's data type, and reports per-column
/// statistics: counts, min/max, lengths, case shape, numeric moments, and the
/// most frequent values.
#[derive(Parser, Debug)]
#[command(name = "csv-profiler")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to profile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of lines to sample for sniffing (default: 100)
    #[arg(short = 'n', long, default_value = "100")]
    sample_lines: usize,

    /// Number of bytes to sample for sniffing (overrides --sample-lines)
    #[arg(short = 'b', long)]
    sample_bytes: Option<usize>,

    /// Use the entire file as the sniffing sample
    #[arg(short = 'a', long)]
    all: bool,

    /// Force a specific delimiter (single character)
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Force a specific quote character (single character, or 'none')
    #[arg(short = 'q', long)]
    quote: Option<String>,

    /// Force header presence on or off instead of detecting it
    #[arg(long)]
    header: Option<bool>,

    /// Number of entries shown per top-values table
    #[arg(short = 't', long, default_value = "20")]
    top: usize,

    /// Maximum distinct values tracked exactly per field
    #[arg(long, default_value = "10000")]
    max_values: usize,

    /// Skip malformed records instead of aborting
    #[arg(long)]
    skip_bad_records: bool,

    /// Output format: text (default) or parsable
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Only report the sniffed dialect, skipping the statistics pass
    #[arg(long)]
    dialect_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Parsable,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default()).init();
    let args = Args::parse();

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = profile_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn profile_file(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut profiler = Profiler::new();

    if args.all {
        profiler.sample_size(SampleSize::All);
    } else if let Some(bytes) = args.sample_bytes {
        profiler.sample_size(SampleSize::Bytes(bytes));
    } else {
        profiler.sample_size(SampleSize::Lines(args.sample_lines));
    }

    profiler.top_values(args.top).cardinality_cap(args.max_values);

    if args.skip_bad_records {
        profiler.malformed_policy(MalformedPolicy::Skip);
    }

    if let Some(delim) = args.delimiter {
        profiler.delimiter(delim);
    }

    if let Some(ref quote_str) = args.quote {
        if quote_str.eq_ignore_ascii_case("none") {
            profiler.quote(Quote::None);
        } else if let Some(c) = quote_str.chars().next() {
            profiler.quote(Quote::Some(c));
        }
    }

    if let Some(header) = args.header {
        profiler.header(header);
    }

    if args.dialect_only {
        let dialect = profiler.sniff_path(path)?;
        println!("File: {}", path.display());
        println!("  Delimiter: {:?}", dialect.delimiter);
        println!("  Quote: {}", dialect.quote);
        println!("  Quoting: {}", dialect.quoting);
        println!("  Has header: {}", dialect.has_header);
        println!();
        return Ok(());
    }

    let report = profiler.profile_path(path)?;

    match args.format {
        OutputFormat::Text => print_text_output(path, &report),
        OutputFormat::Parsable => print_parsable_output(&report)?,
    }

    Ok(())
}

fn print_text_output(path: &PathBuf, report: &Report) {
    let dialect = &report.file.dialect;
    println!("File: {}", path.display());
    println!("  Format: {}", report.file.format_type);
    println!("  Delimiter: {:?}", dialect.delimiter);
    println!("  Quote: {}", dialect.quote);
    println!("  Quoting: {}", dialect.quoting);
    println!(
        "  Escape: {}",
        dialect
            .escape
            .map_or_else(|| "none".to_string(), |c| c.to_string())
    );
    println!("  Double quote: {}", dialect.double_quote);
    println!("  Skip initial space: {}", dialect.skip_initial_space);
    println!("  Line terminator: {}", dialect.line_terminator.as_str());
    println!("  Has header: {}", dialect.has_header);
    println!("  Records: {}", report.file.record_count);
    println!("  Fields: {}", report.file.field_count);

    for field in &report.fields {
        println!();
        println!("  Field {}: {}", field.field_number, field.name);
        println!("    Type: {}", field.inferred_type);
        print_count(field, "Known values", field.known_values);
        print_count(field, "Unique values", field.unique_values);
        println!("    Wrong field count: {}", field.wrong_field_cnt);
        if let Some(min) = &field.min {
            println!("    Min: {min}");
        }
        if let Some(max) = &field.max {
            println!("    Max: {max}");
        }
        if let Some(case) = &field.case {
            println!("    Case: {case}");
        }
        println!(
            "    Length: min {} / mean {:.2} / max {}",
            field.min_length, field.mean_length, field.max_length
        );
        if let Some(numeric) = &field.numeric {
            println!("    Mean: {}", numeric.mean);
            println!("    Median: {}", numeric.median);
            println!("    Variance: {}", numeric.variance);
            println!("    Std dev: {}", numeric.std_dev);
        }
        match &field.top_values {
            TopValues::Values(entries) => {
                println!("    Top values:");
                for (value, count) in entries {
                    println!("      {value}: {count}");
                }
            }
            TopValues::NotShown => println!("    Top values: not shown"),
        }
    }

    println!();
}

fn print_count(field: &FieldReport, label: &str, value: u64) {
    if field.values_truncated {
        println!("    {label}: >= {value} (cardinality cap reached)");
    } else {
        println!("    {label}: {value}");
    }
}

/// Machine-readable output: one `division,section,subsection,key,value` row
/// per fact, fully quoted so downstream consumers can parse it with any CSV
/// reader.
fn print_parsable_output(report: &Report) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(std::io::stdout());

    let dialect = &report.file.dialect;
    let mut file_row = |key: &str, value: String| {
        writer.write_record(["file_analysis_results", "main", "main", key, value.as_str()])
    };
    file_row("record_count", report.file.record_count.to_string())?;
    file_row("field_count", report.file.field_count.to_string())?;
    file_row("delimiter", format!("'{}'", dialect.delimiter))?;
    file_row("quoting", dialect.quoting.to_string())?;
    file_row("quote_char", dialect.quote.to_string())?;
    file_row("doublequote", dialect.double_quote.to_string())?;
    file_row(
        "escapechar",
        dialect
            .escape
            .map_or_else(|| "none".to_string(), |c| c.to_string()),
    )?;
    file_row(
        "skipinitialspace",
        dialect.skip_initial_space.to_string(),
    )?;
    file_row("hasheader", dialect.has_header.to_string())?;
    file_row("format_type", report.file.format_type.to_string())?;

    for field in &report.fields {
        let section = format!("field_{}", field.field_number);
        let mut field_row = |key: &str, value: String| {
            writer.write_record([
                "field_analysis_results",
                section.as_str(),
                "main",
                key,
                value.as_str(),
            ])
        };
        field_row("field_number", field.field_number.to_string())?;
        field_row("name", field.name.clone())?;
        field_row("type", field.inferred_type.to_string())?;
        field_row("known_values", field.known_values.to_string())?;
        field_row("unique_values", field.unique_values.to_string())?;
        field_row("values_truncated", field.values_truncated.to_string())?;
        field_row("wrong_field_cnt", field.wrong_field_cnt.to_string())?;
        if let Some(min) = &field.min {
            field_row("min", min.clone())?;
        }
        if let Some(max) = &field.max {
            field_row("max", max.clone())?;
        }
        if let Some(case) = &field.case {
            field_row("case", case.to_string())?;
        }
        field_row("min_length", field.min_length.to_string())?;
        field_row("mean_length", field.mean_length.to_string())?;
        field_row("max_length", field.max_length.to_string())?;
        if let Some(numeric) = &field.numeric {
            field_row("mean", numeric.mean.to_string())?;
            field_row("median", numeric.median.to_string())?;
            field_row("variance", numeric.variance.to_string())?;
            field_row("std_dev", numeric.std_dev.to_string())?;
        }

        match &field.top_values {
            TopValues::Values(entries) => {
                for (value, count) in entries {
                    let count = count.to_string();
                    writer.write_record([
                        "field_analysis_results",
                        section.as_str(),
                        "top_values",
                        value.as_str(),
                        count.as_str(),
                    ])?;
                }
            }
            TopValues::NotShown => {
                writer.write_record([
                    "field_analysis_results",
                    section.as_str(),
                    "top_values",
                    "top_values_not_shown",
                    " ",
                ])?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
