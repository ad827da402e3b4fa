use std::collections::BTreeMap;

use serde::Serialize;

/// One accepted line of tool output, keyed by logical field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Value of `field`, or the empty string when the row lacks it.
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn try_get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

/// Parse tabular tool output into rows.
///
/// Each non-blank line is split into at most `fields.len()` tokens on
/// `separator`, or on runs of whitespace when `separator` is `None`. The
/// last field takes whatever remains of the line. Lines with fewer tokens
/// than fields are dropped.
pub fn parse_table(output: &str, fields: &[&str], separator: Option<char>) -> Vec<Row> {
    if fields.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = match separator {
            Some(sep) => line.splitn(fields.len(), sep).map(str::trim).collect(),
            None => split_whitespace_n(line, fields.len()),
        };

        if tokens.len() != fields.len() {
            tracing::trace!(line, expected = fields.len(), got = tokens.len(), "Dropping malformed row");
            continue;
        }

        rows.push(fields.iter().copied().zip(tokens).collect());
    }
    rows
}

fn split_whitespace_n(line: &str, n: usize) -> Vec<&str> {
    let mut tokens = Vec::with_capacity(n);
    let mut rest = line.trim();

    while !rest.is_empty() && tokens.len() + 1 < n {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                tokens.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                tokens.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        tokens.push(rest);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_rows_and_folds_extra_tokens_into_last_field() {
        let rows = parse_table(
            "1|job1|RUNNING\n2|job2\n3|job3|PENDING|extra\n",
            &["id", "name", "state"],
            Some('|'),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), "1");
        assert_eq!(rows[0].get("name"), "job1");
        assert_eq!(rows[0].get("state"), "RUNNING");
        assert_eq!(rows[1].get("id"), "3");
        assert_eq!(rows[1].get("name"), "job3");
        assert_eq!(rows[1].get("state"), "PENDING|extra");
    }

    #[test]
    fn keeps_input_order() {
        let rows = parse_table("c|3\na|1\nb|2\n", &["name", "n"], Some('|'));
        let names: Vec<&str> = rows.iter().map(|r| r.get("name")).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse_table("\n  \nRUNNING|3\n\n", &["state", "nodes"], Some('|'));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("nodes"), "3");
    }

    #[test]
    fn empty_values_are_kept() {
        let rows = parse_table("gpu||4\n", &["partition", "gres", "nodes"], Some('|'));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("gres"), "");
        assert_eq!(rows[0].try_get("gres"), Some(""));
        assert_eq!(rows[0].try_get("missing"), None);
    }

    #[test]
    fn whitespace_mode_splits_on_runs() {
        let rows = parse_table(
            "  101   train   RUNNING\n102 eval\n103 sweep PENDING (Resources)\n",
            &["id", "name", "state"],
            None,
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), "101");
        assert_eq!(rows[0].get("state"), "RUNNING");
        assert_eq!(rows[1].get("id"), "103");
        assert_eq!(rows[1].get("state"), "PENDING (Resources)");
    }

    #[test]
    fn single_field_takes_whole_line() {
        let rows = parse_table("2024-03-01T10:00:00\n", &["end"], Some('|'));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("end"), "2024-03-01T10:00:00");
    }

    #[test]
    fn no_fields_yields_nothing() {
        assert!(parse_table("a|b\n", &[], Some('|')).is_empty());
    }
}
