/// CSV serialization for the export endpoint
///
/// There are four fixed export shapes and hard row caps, so this stays a
/// plain in-memory builder. Encoding rules: header row first, empty string
/// for NULL, and a field is double-quote wrapped (with inner quotes
/// doubled) only when it contains a comma, a quote, or a newline.

use chrono::{DateTime, Utc};
use std::fmt::Display;

/// A row type that can be flattened into one CSV line
pub trait CsvRecord {
    /// Column names, in output order
    fn headers() -> &'static [&'static str];

    /// Field values in the same order as `headers()`
    fn fields(&self) -> Vec<String>;
}

/// Renders rows to a CSV document, header first
///
/// An empty slice produces an empty string, matching what the dashboard
/// expects for a filter that selected nothing.
pub fn to_csv<R: CsvRecord>(rows: &[R]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(R::headers().join(","));

    for row in rows {
        let line = row
            .fields()
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Quotes a field when it would otherwise break the row
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats an optional value, NULL becoming the empty string
pub fn opt_field<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Formats a timestamp the way spreadsheets parse reliably
pub fn timestamp_field(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Formats an optional timestamp
pub fn opt_timestamp_field(value: &Option<DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: String,
        note: Option<String>,
        count: i64,
    }

    impl CsvRecord for Row {
        fn headers() -> &'static [&'static str] {
            &["name", "note", "count"]
        }

        fn fields(&self) -> Vec<String> {
            vec![
                self.name.clone(),
                opt_field(&self.note),
                self.count.to_string(),
            ]
        }
    }

    #[test]
    fn test_empty_rows_produce_empty_string() {
        let rows: Vec<Row> = vec![];
        assert_eq!(to_csv(&rows), "");
    }

    #[test]
    fn test_header_and_rows() {
        let rows = vec![
            Row {
                name: "alpha".to_string(),
                note: Some("plain".to_string()),
                count: 1,
            },
            Row {
                name: "beta".to_string(),
                note: None,
                count: 2,
            },
        ];

        assert_eq!(to_csv(&rows), "name,note,count\nalpha,plain,1\nbeta,,2");
    }

    #[test]
    fn test_escape_comma() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_escape_quotes_are_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_escape_newline() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_plain_field_untouched() {
        assert_eq!(escape_field("plain text"), "plain text");
    }

    #[test]
    fn test_escaped_field_in_row() {
        let rows = vec![Row {
            name: "has,comma".to_string(),
            note: Some("has \"quote\"".to_string()),
            count: 3,
        }];

        assert_eq!(
            to_csv(&rows),
            "name,note,count\n\"has,comma\",\"has \"\"quote\"\"\",3"
        );
    }
}
