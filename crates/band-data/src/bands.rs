//! Band list dataset: one row per band with ranking and artwork links.

use std::collections::HashMap;

use guide_common::Ranking;
use tracing::{debug, warn};

use crate::error::{ParseError, Result};
use crate::table::{field, split_line, Header};

/// One band from the band-list CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandRecord {
    pub name: String,
    pub ranking: Ranking,
    pub image_url: Option<String>,
    pub description_url: Option<String>,
}

/// All bands from one refresh cycle, unique by name.
#[derive(Debug, Clone, Default)]
pub struct BandList {
    records: Vec<BandRecord>,
    by_name: HashMap<String, usize>,
}

impl BandList {
    /// Parse the band-list CSV.
    ///
    /// The `name` column is required; `rank`, `imageUrl` and
    /// `descriptionUrl` are optional and located by header name. Rows
    /// without a name are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header_line = lines.next().ok_or(ParseError::MissingHeader)?;
        let header = Header::parse(header_line);

        let name_col = header
            .position(&["name", "band", "bandname"])
            .ok_or(ParseError::MissingColumn("name"))?;
        let rank_col = header.position(&["rank", "ranking"]);
        let image_col = header.position(&["imageurl", "image"]);
        let desc_col = header.position(&["descriptionurl", "description"]);

        let mut list = BandList::default();
        for line in lines {
            let fields = split_line(line);
            let Some(name) = field(&fields, Some(name_col)) else {
                warn!(line = %line, "Skipping band row without a name");
                continue;
            };
            list.insert(BandRecord {
                name: name.to_string(),
                ranking: field(&fields, rank_col)
                    .map(Ranking::parse)
                    .unwrap_or_default(),
                image_url: field(&fields, image_col).map(str::to_string),
                description_url: field(&fields, desc_col).map(str::to_string),
            });
        }
        Ok(list)
    }

    fn insert(&mut self, record: BandRecord) {
        match self.by_name.get(&record.name) {
            Some(&idx) => {
                debug!(band = %record.name, "Replacing duplicate band row");
                self.records[idx] = record;
            }
            None => {
                self.by_name.insert(record.name.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&BandRecord> {
        self.by_name.get(name).map(|&idx| &self.records[idx])
    }

    /// Bands in file order.
    pub fn iter(&self) -> impl Iterator<Item = &BandRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let list = BandList::parse("name,rank\nSlayer,Must\nTool,Might\n").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("Slayer").unwrap().ranking, Ranking::Must);
        assert_eq!(list.get("Tool").unwrap().ranking, Ranking::Might);
    }

    #[test]
    fn test_parse_reordered_columns() {
        let list = BandList::parse("imageUrl,rank,name\nhttp://x/s.jpg,Must,Slayer\n").unwrap();
        let slayer = list.get("Slayer").unwrap();
        assert_eq!(slayer.ranking, Ranking::Must);
        assert_eq!(slayer.image_url.as_deref(), Some("http://x/s.jpg"));
    }

    #[test]
    fn test_parse_missing_name_column_fails() {
        let err = BandList::parse("rank,imageUrl\nMust,\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("name")));
    }

    #[test]
    fn test_parse_empty_file_fails() {
        assert!(matches!(
            BandList::parse("\n\n"),
            Err(ParseError::MissingHeader)
        ));
    }

    #[test]
    fn test_row_without_name_skipped() {
        let list = BandList::parse("name,rank\n,Must\nTool,Might\n").unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.get("Tool").is_some());
    }

    #[test]
    fn test_unmatched_ranking_is_unknown() {
        let list = BandList::parse("name,rank\nSlayer,headliner\nTool,\n").unwrap();
        assert_eq!(list.get("Slayer").unwrap().ranking, Ranking::Unknown);
        assert_eq!(list.get("Tool").unwrap().ranking, Ranking::Unknown);
    }

    #[test]
    fn test_quoted_name_with_comma() {
        let list = BandList::parse("name,rank\n\"Emerson, Lake & Palmer\",Might\n").unwrap();
        assert!(list.get("Emerson, Lake & Palmer").is_some());
    }

    #[test]
    fn test_duplicate_band_last_row_wins() {
        let list = BandList::parse("name,rank\nSlayer,Wont\nSlayer,Must\n").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("Slayer").unwrap().ranking, Ranking::Must);
    }
}
