//! Schedule dataset: per-band, time-ordered event index.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Utc;
use guide_common::event_epoch;
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::table::{field, split_line, Header};

/// Kind of schedule event.
///
/// Text that matches none of the known kinds parses to `Unknown`; an absent
/// type column defaults to `Show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Show,
    MeetAndGreet,
    Clinic,
    SpecialEvent,
    ListeningParty,
    Unofficial,
    Unknown,
}

impl EventType {
    pub fn parse(text: &str) -> Self {
        let normalized = text
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '_', '-', '&'], "");
        match normalized.as_str() {
            "show" => EventType::Show,
            "meetandgreet" | "meetgreet" => EventType::MeetAndGreet,
            "clinic" => EventType::Clinic,
            "specialevent" => EventType::SpecialEvent,
            "listeningparty" => EventType::ListeningParty,
            "unofficial" => EventType::Unofficial,
            _ => EventType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Show => "show",
            EventType::MeetAndGreet => "meet and greet",
            EventType::Clinic => "clinic",
            EventType::SpecialEvent => "special event",
            EventType::ListeningParty => "listening party",
            EventType::Unofficial => "unofficial",
            EventType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schedule row with its derived start/end epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub band: String,
    pub venue: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub event_type: EventType,
    pub notes: Option<String>,
    pub description_url: Option<String>,
    pub image_url: Option<String>,
    pub start_epoch: i64,
    pub end_epoch: i64,
}

/// Schedule entries grouped per band, ordered by start epoch.
///
/// Two entries for the same band at the same epoch are both retained; the
/// insertion sequence breaks the tie, so nothing is silently overwritten.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    by_band: HashMap<String, BTreeMap<(i64, u64), ScheduleEntry>>,
    next_seq: u64,
    len: usize,
}

impl ScheduleIndex {
    /// Parse a schedule CSV, stamping rows with unparseable times with the
    /// current wall clock.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_sentinel(text, Utc::now().timestamp())
    }

    /// Parse with an explicit sentinel epoch for rows whose (day, time) pair
    /// does not match the fixed pattern. Deterministic, used by tests.
    pub fn parse_with_sentinel(text: &str, sentinel_epoch: i64) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header_line = lines.next().ok_or(ParseError::MissingHeader)?;
        let header = Header::parse(header_line);

        let band_col = header
            .position(&["band", "name", "bandname"])
            .ok_or(ParseError::MissingColumn("band"))?;
        let day_col = header
            .position(&["day", "date"])
            .ok_or(ParseError::MissingColumn("day"))?;
        let start_col = header
            .position(&["starttime", "start"])
            .ok_or(ParseError::MissingColumn("startTime"))?;
        let location_col = header.position(&["location", "venue"]);
        let type_col = header.position(&["type", "eventtype"]);
        let end_col = header.position(&["endtime", "end"]);
        let notes_col = header.position(&["notes"]);
        let desc_col = header.position(&["descriptionurl", "description"]);
        let image_col = header.position(&["imageurl", "image"]);

        let mut index = ScheduleIndex::default();
        for line in lines {
            let fields = split_line(line);
            let band = field(&fields, Some(band_col));
            let day = field(&fields, Some(day_col));
            let start_time = field(&fields, Some(start_col));
            let (Some(band), Some(day), Some(start_time)) = (band, day, start_time) else {
                warn!(line = %line, "Skipping schedule row with missing required fields");
                continue;
            };

            let end_time = field(&fields, end_col).unwrap_or_default();
            index.insert(ScheduleEntry {
                band: band.to_string(),
                venue: field(&fields, location_col).unwrap_or_default().to_string(),
                day: day.to_string(),
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
                event_type: field(&fields, type_col)
                    .map(EventType::parse)
                    .unwrap_or(EventType::Show),
                notes: field(&fields, notes_col).map(str::to_string),
                description_url: field(&fields, desc_col).map(str::to_string),
                image_url: field(&fields, image_col).map(str::to_string),
                start_epoch: event_epoch(day, start_time, sentinel_epoch),
                end_epoch: event_epoch(day, end_time, sentinel_epoch),
            });
        }
        Ok(index)
    }

    fn insert(&mut self, entry: ScheduleEntry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_band
            .entry(entry.band.clone())
            .or_default()
            .insert((entry.start_epoch, seq), entry);
        self.len += 1;
    }

    /// Entries for a band in start-epoch order, insertion order on ties.
    pub fn entries(&self, band: &str) -> impl Iterator<Item = &ScheduleEntry> {
        self.by_band.get(band).into_iter().flat_map(|m| m.values())
    }

    /// Entries for a band starting at or after `epoch`.
    pub fn entries_from(&self, band: &str, epoch: i64) -> impl Iterator<Item = &ScheduleEntry> {
        self.by_band
            .get(band)
            .into_iter()
            .flat_map(move |m| m.range((epoch, 0)..).map(|(_, entry)| entry))
    }

    pub fn bands(&self) -> impl Iterator<Item = &str> {
        self.by_band.keys().map(String::as_str)
    }

    pub fn band_count(&self) -> usize {
        self.by_band.len()
    }

    /// Total number of entries across all bands.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
