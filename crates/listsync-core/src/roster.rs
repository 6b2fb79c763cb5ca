//! Local roster loading.
//!
//! The roster file is a YAML mapping from subgroup key to either `null` or a
//! sequence of member records:
//!
//! ```yaml
//! announce:
//!   - email: alice@example.com
//!     name: Alice
//!   - email: "Bob Jones <bob@example.com>"
//! archive: ~
//! ```
//!
//! No validation happens here: records are handed to
//! [`normalize_members`](crate::normalize::normalize_members) as-is, and a
//! `null` value is read as an empty list.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::errors::RosterError;

/// One raw member entry from the roster file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MemberRecord {
    /// Email field. May carry surrounding text around the address.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl MemberRecord {
    /// Record with an email and an optional name.
    pub fn new(email: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            email: Some(email.into()),
            name: name.map(str::to_string),
        }
    }
}

/// The parsed roster file, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterFile {
    subgroups: Vec<(String, Vec<MemberRecord>)>,
}

impl RosterFile {
    /// Build a roster from `(key, records)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<MemberRecord>)>) -> Self {
        Self {
            subgroups: entries.into_iter().collect(),
        }
    }

    /// True when the file defines no subgroup keys at all.
    pub fn is_empty(&self) -> bool {
        self.subgroups.is_empty()
    }

    /// Number of subgroup keys.
    pub fn len(&self) -> usize {
        self.subgroups.len()
    }

    /// Iterate subgroup keys and their raw records in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MemberRecord])> {
        self.subgroups
            .iter()
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }
}

/// Read and parse the roster file at `path`.
pub fn load_roster(path: &Path) -> Result<RosterFile, RosterError> {
    if !path.exists() {
        return Err(RosterError::NotFound(path.to_path_buf()));
    }
    debug!(?path, "loading roster file");
    let content = std::fs::read_to_string(path)?;
    parse_roster(&content)
}

/// Parse roster YAML. An empty document yields an empty roster.
pub fn parse_roster(content: &str) -> Result<RosterFile, RosterError> {
    let document: Value = serde_yaml::from_str(content)?;
    let mapping = match document {
        Value::Null => return Ok(RosterFile::default()),
        Value::Mapping(mapping) => mapping,
        other => return Err(RosterError::NotAMapping(kind_of(&other))),
    };

    let mut subgroups = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => return Err(RosterError::InvalidKey(kind_of(&other).to_string())),
        };
        let records = if value.is_null() {
            Vec::new()
        } else {
            serde_yaml::from_value::<Vec<MemberRecord>>(value)?
        };
        subgroups.push((key, records));
    }

    Ok(RosterFile { subgroups })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_records_in_document_order() {
        let roster = parse_roster(
            "zeta:\n  - email: z@x.com\nalpha:\n  - email: a@x.com\n    name: Alice\n",
        )
        .unwrap();
        let keys: Vec<&str> = roster.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let (_, alpha) = roster.iter().nth(1).unwrap();
        assert_eq!(alpha, &[MemberRecord::new("a@x.com", Some("Alice"))]);
    }

    #[test]
    fn null_members_read_as_empty_list() {
        let roster = parse_roster("announce: ~\nother:\n").unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|(_, records)| records.is_empty()));
    }

    #[test]
    fn empty_document_is_empty_roster() {
        assert!(parse_roster("").unwrap().is_empty());
        assert!(parse_roster("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn records_without_email_are_kept_raw() {
        let roster = parse_roster("announce:\n  - name: Nobody\n  - email: ''\n").unwrap();
        let (_, records) = roster.iter().next().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email, None);
        assert_eq!(records[1].email.as_deref(), Some(""));
    }

    #[test]
    fn numeric_keys_become_strings() {
        let roster = parse_roster("2024:\n  - email: a@x.com\n").unwrap();
        assert_eq!(roster.iter().next().unwrap().0, "2024");
    }

    #[test]
    fn rejects_top_level_sequence() {
        let err = parse_roster("- a\n- b\n").unwrap_err();
        assert!(matches!(err, RosterError::NotAMapping("a sequence")));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_roster("announce: [").unwrap_err();
        assert!(matches!(err, RosterError::Yaml(_)));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        let err = load_roster(&path).unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"announce:\n  - email: a@x.com\n").unwrap();
        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 1);
    }
}
