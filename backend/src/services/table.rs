//! Table number context captured when the page opens.

use std::ops::RangeInclusive;

use tracing::{info, warn};

/// Parses a table number, accepting only integers in `1..=max_tables`.
pub fn parse_table_number(raw: &str, max_tables: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|table| (1..=max_tables).contains(table))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableContext {
    auto_detected: Option<u32>,
    max_tables: u32,
}

impl TableContext {
    /// Reads the `table` query parameter. Invalid or out-of-range values are
    /// discarded with a warning and the page falls back to manual selection.
    pub fn detect(param: Option<&str>, max_tables: u32) -> Self {
        let auto_detected = match param.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => None,
            Some(raw) => match parse_table_number(raw, max_tables) {
                Some(table) => {
                    info!(table, "Auto-detected table number");
                    Some(table)
                }
                None => {
                    warn!(raw, max_tables, "Invalid table number in URL parameter");
                    None
                }
            },
        };

        Self {
            auto_detected,
            max_tables,
        }
    }

    pub fn auto_detected(&self) -> Option<u32> {
        self.auto_detected
    }

    pub fn selector_options(&self) -> RangeInclusive<u32> {
        1..=self.max_tables
    }

    /// The pinned table wins; otherwise a manual choice within range.
    pub fn resolve(&self, manual: Option<u32>) -> Option<u32> {
        self.auto_detected
            .or_else(|| manual.filter(|table| self.selector_options().contains(table)))
    }
}
