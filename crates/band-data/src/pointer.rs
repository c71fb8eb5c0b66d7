//! Pointer manifest: logical dataset names resolved to download URLs.
//!
//! The manifest is a small `key=url` text file fetched at the start of every
//! refresh cycle; the other datasets are downloaded from the URLs it names.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{ParseError, Result};

pub const BAND_LIST_KEY: &str = "bandList";
pub const SCHEDULE_KEY: &str = "schedule";
pub const DESCRIPTION_MAP_KEY: &str = "descriptionMap";

#[derive(Debug, Clone, Default)]
pub struct PointerManifest {
    urls: HashMap<String, String>,
}

impl PointerManifest {
    /// Parse `key=url` lines.
    ///
    /// Blank lines and `#` comments are ignored; lines without a separator
    /// are skipped with a warning. A manifest with no entries at all is an
    /// error so a garbled download fails the stage instead of wiping the
    /// dataset URLs.
    pub fn parse(text: &str) -> Result<Self> {
        let mut urls = HashMap::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.split_once('=') {
                Some((key, url)) if !key.trim().is_empty() && !url.trim().is_empty() => {
                    urls.insert(key.trim().to_string(), url.trim().to_string());
                }
                _ => warn!(line = %line, "Skipping malformed pointer entry"),
            }
        }
        if urls.is_empty() {
            return Err(ParseError::EmptyPointer);
        }
        Ok(Self { urls })
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    pub fn band_list(&self) -> Option<&str> {
        self.url(BAND_LIST_KEY)
    }

    pub fn schedule(&self) -> Option<&str> {
        self.url(SCHEDULE_KEY)
    }

    pub fn description_map(&self) -> Option<&str> {
        self.url(DESCRIPTION_MAP_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = PointerManifest::parse(
            "# current feed\n\
             bandList=http://x/bands.csv\n\
             schedule=http://x/schedule.csv\n\
             descriptionMap=http://x/descriptions.csv\n",
        )
        .unwrap();
        assert_eq!(manifest.band_list(), Some("http://x/bands.csv"));
        assert_eq!(manifest.schedule(), Some("http://x/schedule.csv"));
        assert_eq!(manifest.description_map(), Some("http://x/descriptions.csv"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let manifest = PointerManifest::parse("bandList=http://x/bands.csv\n").unwrap();
        assert_eq!(manifest.schedule(), None);
    }

    #[test]
    fn test_malformed_lines_skipped_unknown_keys_kept() {
        let manifest = PointerManifest::parse(
            "not a pointer line\nbandList=http://x/bands.csv\nextraFeed=http://x/extra\n",
        )
        .unwrap();
        assert_eq!(manifest.band_list(), Some("http://x/bands.csv"));
        assert_eq!(manifest.url("extraFeed"), Some("http://x/extra"));
    }

    #[test]
    fn test_empty_manifest_fails() {
        assert!(matches!(
            PointerManifest::parse("# nothing here\n"),
            Err(ParseError::EmptyPointer)
        ));
        assert!(matches!(
            PointerManifest::parse(""),
            Err(ParseError::EmptyPointer)
        ));
    }
}
