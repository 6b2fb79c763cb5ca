//! Wire types and response decoding.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::DirectoryError;

/// One page of a paginated listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Records on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    /// Cursor for the next page; `None` once the listing is exhausted.
    #[serde(default, deserialize_with = "deserialize_cursor")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page followed by more pages.
    pub fn more(data: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            data,
            next_page_token: Some(next.into()),
        }
    }

    /// The final page.
    pub fn last(data: Vec<T>) -> Self {
        Self {
            data,
            next_page_token: None,
        }
    }
}

/// A subgroup record from `getsubgroups`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SubgroupEntry {
    /// Fully qualified name (`group+child...`).
    #[serde(default)]
    pub name: Option<String>,
}

impl SubgroupEntry {
    /// Entry for `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// A member record from `getmembers`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MemberEntry {
    /// Member address.
    #[serde(default)]
    pub email: Option<String>,
    /// Raw moderation status.
    #[serde(default)]
    pub mod_status: Option<String>,
}

impl MemberEntry {
    /// Entry with an email and raw moderation status.
    pub fn new(email: impl Into<String>, mod_status: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            mod_status: Some(mod_status.into()),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `0` token marks both "start" and "no further pages"; it, `null`, a
/// missing field and an empty string all decode to `None`.
fn deserialize_cursor<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let token = n.to_string();
            Ok((token != "0").then_some(token))
        }
        Some(Value::String(s)) => Ok((!s.is_empty() && s != "0").then_some(s)),
        Some(other) => Err(de::Error::custom(format!(
            "unsupported page token: {other}"
        ))),
    }
}

/// Decode a response body, mapping the error envelope to
/// [`DirectoryError::Api`].
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, DirectoryError> {
    let value: Value = serde_json::from_str(body)?;
    if value.get("object").and_then(Value::as_str) == Some("error") {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        return Err(DirectoryError::Api { kind });
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode a response given its HTTP status.
///
/// An error envelope wins over the status code. A non-success status with
/// any other body becomes [`DirectoryError::Status`].
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, DirectoryError> {
    let success = (200..300).contains(&status);
    match decode(body) {
        Err(err @ DirectoryError::Api { .. }) => Err(err),
        Ok(value) if success => Ok(value),
        Err(err) if success => Err(err),
        _ => Err(DirectoryError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_with_numeric_cursor() {
        let page: Page<SubgroupEntry> =
            decode(r#"{"object":"list","data":[{"name":"grp+a-list"}],"next_page_token":1234}"#)
                .unwrap();
        assert_eq!(page.data, vec![SubgroupEntry::named("grp+a-list")]);
        assert_eq!(page.next_page_token.as_deref(), Some("1234"));
    }

    #[test]
    fn zero_cursor_means_last_page() {
        let page: Page<SubgroupEntry> = decode(r#"{"data":[],"next_page_token":0}"#).unwrap();
        assert_eq!(page.next_page_token, None);

        let page: Page<SubgroupEntry> = decode(r#"{"data":[],"next_page_token":"0"}"#).unwrap();
        assert_eq!(page.next_page_token, None);

        let page: Page<SubgroupEntry> = decode(r#"{"data":[]}"#).unwrap();
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn string_cursor_is_kept() {
        let page: Page<MemberEntry> =
            decode(r#"{"data":[],"next_page_token":"abc"}"#).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn null_data_is_empty() {
        let page: Page<MemberEntry> = decode(r#"{"data":null,"next_page_token":0}"#).unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn member_fields_are_optional() {
        let page: Page<MemberEntry> = decode(
            r#"{"data":[{"email":"a@x.com","mod_status":"sub_modstatus_none","user_id":7},{"user_id":8}]}"#,
        )
        .unwrap();
        assert_eq!(page.data[0], MemberEntry::new("a@x.com", "sub_modstatus_none"));
        assert_eq!(page.data[1], MemberEntry::default());
    }

    #[test]
    fn error_envelope_decodes_to_api_error() {
        let err = decode::<Page<MemberEntry>>(r#"{"object":"error","type":"unauthorized"}"#)
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Api { ref kind } if kind == "unauthorized"));

        let err = decode::<Value>(r#"{"object":"error"}"#).unwrap_err();
        assert_eq!(err.kind(), "unknown");
    }

    #[test]
    fn decode_response_prefers_envelope_over_status() {
        let err = decode_response::<Value>(400, r#"{"object":"error","type":"inadequate_permissions"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "inadequate_permissions");

        let err = decode_response::<Value>(500, "oops").unwrap_err();
        assert!(matches!(err, DirectoryError::Status { status: 500, .. }));

        let err = decode_response::<Value>(503, "{}").unwrap_err();
        assert!(matches!(err, DirectoryError::Status { status: 503, .. }));

        let err = decode_response::<Value>(200, "not json").unwrap_err();
        assert!(matches!(err, DirectoryError::Decode(_)));

        assert!(decode_response::<Value>(200, r#"{"object":"direct_add_results"}"#).is_ok());
    }
}
