//! Band description dataset: band name to description source.
//!
//! The source is either a URL to fetch prose from or the prose itself; the
//! sync pipeline does not care which, it only maps names to strings.

use std::collections::HashMap;

use tracing::warn;

use crate::table::split_line;

/// Mapping from band name to description URL or inline text.
#[derive(Debug, Clone, Default)]
pub struct DescriptionMap {
    map: HashMap<String, String>,
}

impl DescriptionMap {
    /// Parse the two-column (band, source) CSV.
    ///
    /// The header row is recognized by the `Band` sentinel value in column 1
    /// rather than by its index, so a leading blank line does not shift it.
    /// Rows without both columns are skipped.
    pub fn parse(text: &str) -> Self {
        let mut map = HashMap::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let fields = split_line(trimmed);
            if fields.first().map(|f| f.trim()) == Some("Band") {
                continue;
            }
            let band = fields.first().map(|f| f.trim()).unwrap_or_default();
            let source = fields.get(1).map(|f| f.trim()).unwrap_or_default();
            if band.is_empty() || source.is_empty() {
                warn!(line = %line, "Skipping malformed description row");
                continue;
            }
            map.insert(band.to_string(), source.to_string());
        }
        Self { map }
    }

    pub fn get(&self, band: &str) -> Option<&str> {
        self.map.get(band).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
