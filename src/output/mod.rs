//
//  bitbucket-scm-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Formatting Module
//!
//! Renders command results either as human-readable tables or as pretty JSON
//! for scripts.
//!
//! ## Output Formats
//!
//! | Format | Use Case | Flag |
//! |--------|----------|------|
//! | Table | Interactive terminal use | (default) |
//! | JSON | Scripting, piping to `jq` | `--json` |
//!
//! Single resources implement [`TableOutput`]; lists implement [`TableRow`] so
//! every item lands in one shared table.

mod table;

pub use table::*;

use console::style;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tables and key/value fields with optional colors.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Picks the format from the `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Writes command results in the selected format.
///
/// Colors follow the terminal: `console` disables them when stdout is not a
/// TTY or `NO_COLOR` is set.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// Writes a single value.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes a list of values as one table, or a JSON array.
    ///
    /// An empty list prints `empty` in table mode and `[]` in JSON mode.
    pub fn write_list<T: Serialize + TableRow>(&self, values: &[T], empty: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(values)?),
            OutputFormat::Table if values.is_empty() => println!("{}", empty),
            OutputFormat::Table => TableBuilder::new()
                .color(self.color)
                .headers(T::headers().iter().copied())
                .rows(values.iter().map(|value| value.row(self.color)))
                .print(),
        }
        Ok(())
    }

    /// Writes a raw JSON value, or a plain line in table mode.
    pub fn write_value(&self, json: &serde_json::Value, text: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(json)?),
            OutputFormat::Table => println!("{}", text),
        }
        Ok(())
    }

    pub fn write_error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn write_success(&self, msg: &str) {
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// Human-readable rendering of a single resource.
pub trait TableOutput {
    fn print_table(&self, color: bool);
}

/// One row of a list table.
pub trait TableRow {
    /// Column headers, shared by every row.
    fn headers() -> &'static [&'static str];

    /// Cell values, in header order.
    fn row(&self, color: bool) -> Vec<String>;
}

/// Prints a `key: value` line, dimming the key when colors are on.
pub fn print_field(key: &str, value: &str, color: bool) {
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}
