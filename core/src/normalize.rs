//! Field normalization for loosely typed scanner output.
//!
//! Scanners disagree on JSON types: ports arrive as `443` or `"443"`, status codes as numbers
//! or strings, and `tech` as a string or a list. These helpers fold those shapes into the
//! scalar forms the merged table uses.

use serde_json::Value;

use crate::error::RecordError;

/// Parse a port from a JSON number or a numeric string.
pub fn parse_port(v: &Value) -> Result<u16, RecordError> {
    let parsed = match v {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| RecordError::InvalidPort(v.to_string()))
}

/// Text field: strings verbatim, other scalars stringified, null absent.
pub fn text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Unsigned count such as a status code or content length. Unparseable values are absent.
pub fn count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Join tech tags with a single space. Empty input is absent.
pub fn join_tech<I, S>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = tags
        .into_iter()
        .filter(|t| !t.as_ref().is_empty())
        .map(|t| t.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Record `value` in `seen` unless empty or already present. Order of first sight is kept.
pub fn push_distinct<'a>(seen: &mut Vec<&'a str>, value: Option<&'a str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
}

/// Join collected values with `sep`. Nothing collected is absent.
pub fn join_distinct(values: &[&str], sep: &str) -> Option<String> {
    if values.is_empty() { None } else { Some(values.join(sep)) }
}

/// `deserialize_with` adapters for the record types.
pub(crate) mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::records::Tech;

    pub fn host<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(D::Error::custom(crate::RecordError::InvalidHost)),
        }
    }

    pub fn port<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
        let v = Value::deserialize(d)?;
        super::parse_port(&v).map_err(D::Error::custom)
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(super::text(&Value::deserialize(d)?))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(super::count(&Value::deserialize(d)?))
    }

    pub fn tech<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Tech>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::Array(items) => Some(Tech::Many(
                items
                    .into_iter()
                    .filter_map(|i| super::text(&i))
                    .collect(),
            )),
            other => super::text(&other).map(Tech::One),
        })
    }
}
