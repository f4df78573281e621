//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Tsv
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// A value that can be printed as one TSV row
pub trait Row {
    const HEADERS: &'static [&'static str];

    fn id(&self) -> &str;
    fn cells(&self) -> Vec<String>;
}

/// Print a single record
pub fn print_one<T: Serialize + Row>(value: &T, format: OutputFormat) -> Result<()> {
    match effective_format(format, false) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", value.id()),
        OutputFormat::Tsv => {
            println!("{}", T::HEADERS.join("\t"));
            println!("{}", value.cells().join("\t"));
        }
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
    }
    Ok(())
}

/// Print a list of records
pub fn print_list<T: Serialize + Row>(values: &[T], format: OutputFormat) -> Result<()> {
    match effective_format(format, true) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(values).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&values).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for value in values {
                println!("{}", value.id());
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!("{}", T::HEADERS.join("\t"));
            for value in values {
                println!("{}", value.cells().join("\t"));
            }
        }
    }
    Ok(())
}
