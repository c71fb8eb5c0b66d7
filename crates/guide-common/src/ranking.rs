//! Attendance ranking assigned to a band.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much the user wants to see a band.
///
/// Parsed from free text; anything unrecognized maps to `Unknown` instead of
/// failing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    Must,
    Might,
    Wont,
    Unknown,
}

impl Ranking {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "must" | "must see" => Ranking::Must,
            "might" | "might see" => Ranking::Might,
            "wont" | "won't" | "wont see" | "won't see" => Ranking::Wont,
            _ => Ranking::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ranking::Must => "must",
            Ranking::Might => "might",
            Ranking::Wont => "wont",
            Ranking::Unknown => "unknown",
        }
    }
}

impl Default for Ranking {
    fn default() -> Self {
        Ranking::Unknown
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
