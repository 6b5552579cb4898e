//
//  bitbucket-scm-client
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Formatting
//!
//! Thin builder over `comfy-table` plus a few cell formatters.
//!
//! ```rust
//! use bitbucket_scm_client::output::TableBuilder;
//!
//! let table = TableBuilder::new()
//!     .color(false)
//!     .headers(["Name", "Slug"])
//!     .row(["Bar", "bar"])
//!     .build();
//! assert!(table.to_string().contains("bar"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;

/// Creates a table with the shared preset.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the header row; cyan when colors are on.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            self.table
                .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors a build or repository state.
pub fn format_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state.to_uppercase().as_str() {
        "SUCCESSFUL" | "AVAILABLE" => style(state).green().to_string(),
        "FAILED" | "OFFLINE" => style(state).red().to_string(),
        "INPROGRESS" | "INITIALISING" => style(state).yellow().to_string(),
        "STOPPED" => style(state).dim().to_string(),
        _ => state.to_string(),
    }
}

pub fn format_bool(value: bool, color: bool) -> String {
    match (value, color) {
        (true, true) => style("Yes").green().to_string(),
        (false, true) => style("No").dim().to_string(),
        (true, false) => "Yes".to_string(),
        (false, false) => "No".to_string(),
    }
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}
