//! Tolerant CSV table primitives.
//!
//! Columns are located by header name, never by fixed position, so
//! server-side column reordering does not break older clients.

use std::collections::HashMap;

/// Split one CSV line into fields.
///
/// Handles double-quoted fields containing commas and `""` escapes. A field
/// is never an error; garbage simply yields garbage fields for the caller to
/// reject.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Header-name to column-position map.
#[derive(Debug, Clone)]
pub struct Header {
    positions: HashMap<String, usize>,
}

impl Header {
    pub fn parse(line: &str) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in split_line(line).iter().enumerate() {
            let key = normalize(name);
            if !key.is_empty() {
                // First occurrence wins when a header repeats a name.
                positions.entry(key).or_insert(idx);
            }
        }
        Self { positions }
    }

    /// Position of the first alias present in the header.
    pub fn position(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.positions.get(*alias).copied())
    }
}

/// Field at `idx`, trimmed; `None` when the column is absent from this row
/// or empty.
pub fn field<'a>(fields: &'a [String], idx: Option<usize>) -> Option<&'a str> {
    let value = fields.get(idx?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .replace([' ', '_', '-'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_line("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_quoted_comma() {
        assert_eq!(
            split_line(r#"Emperor,"Black, symphonic",x"#),
            vec!["Emperor", "Black, symphonic", "x"]
        );
    }

    #[test]
    fn test_split_escaped_quote() {
        assert_eq!(split_line(r#""say ""hi""",b"#), vec![r#"say "hi""#, "b"]);
    }

    #[test]
    fn test_header_lookup_normalizes() {
        let header = Header::parse("Band Name,Start Time,image_url");
        assert_eq!(header.position(&["bandname"]), Some(0));
        assert_eq!(header.position(&["starttime"]), Some(1));
        assert_eq!(header.position(&["imageurl"]), Some(2));
        assert_eq!(header.position(&["missing"]), None);
    }

    #[test]
    fn test_header_alias_order() {
        let header = Header::parse("venue,location");
        // First listed alias that exists wins.
        assert_eq!(header.position(&["location", "venue"]), Some(1));
        assert_eq!(header.position(&["venue", "location"]), Some(0));
    }

    #[test]
    fn test_field_out_of_range_and_empty() {
        let fields = split_line("a, ,c");
        assert_eq!(field(&fields, Some(0)), Some("a"));
        assert_eq!(field(&fields, Some(1)), None);
        assert_eq!(field(&fields, Some(9)), None);
        assert_eq!(field(&fields, None), None);
    }
}
