//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing and the storage-boundary
//! serialization of metadata maps and timestamps.

use chrono::{DateTime, Utc};
use dia_core::metadata::Metadata;
use dia_core::time::parse_timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles RFC 3339 and `SQLite`'s `datetime('now')` format.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches no accepted format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    parse_timestamp(s).map_err(|e| DatabaseError::Query(e.to_string()))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all dia-core enums that serialize as plain strings.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a non-negative INTEGER column as `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is out of range.
pub fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let value = row.get::<i64>(idx)?;
    u32::try_from(value)
        .map_err(|_| DatabaseError::Query(format!("column {idx}: {value} out of range for u32")))
}

/// Read a non-negative INTEGER column as `u64`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is negative.
pub fn get_u64(row: &libsql::Row, idx: i32) -> Result<u64, DatabaseError> {
    let value = row.get::<i64>(idx)?;
    u64::try_from(value)
        .map_err(|_| DatabaseError::Query(format!("column {idx}: {value} out of range for u64")))
}

/// Read a nullable non-negative INTEGER column as `Option<u64>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is negative.
pub fn get_opt_u64(row: &libsql::Row, idx: i32) -> Result<Option<u64>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|value| {
            u64::try_from(value).map_err(|_| {
                DatabaseError::Query(format!("column {idx}: {value} out of range for u64"))
            })
        })
        .transpose()
}

/// Serialize a value to a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}

/// Deserialize a required JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not valid JSON for `T`.
pub fn from_json_text<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))
}

/// Metadata is stored as NULL when empty.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn metadata_to_text(metadata: &Metadata) -> Result<Option<String>, DatabaseError> {
    if metadata.is_empty() {
        Ok(None)
    } else {
        to_json_text(metadata).map(Some)
    }
}

/// Inverse of [`metadata_to_text`]: NULL and empty TEXT become an empty map.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a JSON object of scalars.
pub fn metadata_from_text(s: Option<&str>) -> Result<Metadata, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => from_json_text(s),
        _ => Ok(Metadata::new()),
    }
}

/// Clamp a `u64` into SQLite's signed INTEGER range.
#[must_use]
pub fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dia_core::enums::Position;
    use dia_core::metadata::MetadataValue;

    #[test]
    fn parses_both_datetime_formats() {
        assert!(parse_datetime("2025-10-12T10:00:00+00:00").is_ok());
        assert!(parse_datetime("2025-10-12 10:00:00").is_ok());
        assert!(matches!(
            parse_datetime("not a date"),
            Err(DatabaseError::Query(_))
        ));
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
    }

    #[test]
    fn parses_enum_from_text() {
        let position: Position = parse_enum("con").unwrap();
        assert_eq!(position, Position::Con);
        assert!(parse_enum::<Position>("sideways").is_err());
    }

    #[test]
    fn empty_metadata_is_null() {
        assert_eq!(metadata_to_text(&Metadata::new()).unwrap(), None);
        assert!(metadata_from_text(None).unwrap().is_empty());

        let mut metadata = Metadata::new();
        metadata.insert("tokens".into(), MetadataValue::Integer(5));
        let text = metadata_to_text(&metadata).unwrap().unwrap();
        assert_eq!(metadata_from_text(Some(&text)).unwrap(), metadata);
    }
}
