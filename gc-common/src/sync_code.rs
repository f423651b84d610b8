//! Sync codes: the whole collection as one copy/paste-able string
//!
//! A sync code is standard base64 over the UTF-8 bytes of the JSON record
//! array. Decoding validates every layer and never yields a partial result.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::import::{fill_fields, normalize_keys};
use crate::model::Record;

/// Why a sync code was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("not valid base64: {0}")]
    Base64(String),

    #[error("decoded bytes are not UTF-8 text")]
    Utf8,

    #[error("decoded text is not JSON: {0}")]
    Json(String),

    #[error("expected a list of records")]
    NotAnArray,

    #[error("entry {index} is not a record: {reason}")]
    BadRecord { index: usize, reason: String },
}

/// Encode the full collection as a sync code
pub fn encode(records: &[Record]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(records)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode a sync code back into records, preserving order.
///
/// Surrounding whitespace (common after pasting) is ignored. Field values
/// that are not strings are coerced the same way spreadsheet cells are.
pub fn decode(code: &str) -> Result<Vec<Record>, SyncError> {
    let bytes = STANDARD
        .decode(code.trim())
        .map_err(|e| SyncError::Base64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| SyncError::Utf8)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| SyncError::Json(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(SyncError::NotAnArray);
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| record_from_value(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = records.len(), "Decoded sync code");
    Ok(records)
}

fn record_from_value(index: usize, item: &Value) -> Result<Record, SyncError> {
    let bad = |reason: &str| SyncError::BadRecord {
        index,
        reason: reason.to_string(),
    };

    let object = item.as_object().ok_or_else(|| bad("not an object"))?;
    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(bad("missing id")),
    };

    let normalized = normalize_keys(object);
    let mut record = fill_fields(Record::new(id), &normalized);
    record.image_url = match object.get("imageUrl") {
        Some(Value::String(url)) => Some(url.clone()),
        _ => None,
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("import-1-a-0")
                .with(Field::ModelName, "DS 19")
                .with(Field::CarBrand, "Citroën")
                .with(Field::Remark, "scatola originale, perfetta"),
            Record {
                image_url: Some("data:image/png;base64,AAAA".to_string()),
                ..Record::new("manual-2-xyz12").with(Field::ModelName, "Giulia")
            },
        ]
    }

    #[test]
    fn test_round_trip_preserves_order_and_content() {
        let records = sample();
        let code = encode(&records).unwrap();
        assert_eq!(decode(&code).unwrap(), records);
    }

    #[test]
    fn test_round_trip_keeps_empty_image_url() {
        let records = vec![Record {
            image_url: Some(String::new()),
            ..Record::new("a").with(Field::ModelName, "Stratos")
        }];
        let code = encode(&records).unwrap();
        assert_eq!(decode(&code).unwrap(), records);
    }

    #[test]
    fn test_empty_collection_round_trip() {
        let code = encode(&[]).unwrap();
        assert_eq!(code, "W10=");
        assert!(decode(&code).unwrap().is_empty());
    }

    #[test]
    fn test_code_is_plain_ascii() {
        let code = encode(&sample()).unwrap();
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)));
    }

    #[test]
    fn test_pasted_whitespace_is_ignored() {
        let code = format!("  {}\n", encode(&sample()).unwrap());
        assert_eq!(decode(&code).unwrap().len(), 2);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(decode("%%% not base64"), Err(SyncError::Base64(_))));
        assert_eq!(decode(&STANDARD.encode([0xffu8, 0xfe])), Err(SyncError::Utf8));
        assert!(matches!(decode(&STANDARD.encode("{oops")), Err(SyncError::Json(_))));
        assert_eq!(
            decode(&STANDARD.encode(r#"{"id":"x"}"#)),
            Err(SyncError::NotAnArray)
        );
    }

    #[test]
    fn test_entries_without_id_rejected() {
        let code = STANDARD.encode(r#"[{"id":"a"},{"Modello":"no id"}]"#);
        assert_eq!(
            decode(&code),
            Err(SyncError::BadRecord {
                index: 1,
                reason: "missing id".to_string()
            })
        );
    }

    #[test]
    fn test_loose_entries_are_coerced() {
        let code = STANDARD.encode(r#"[{"id":"a","Anno":1972,"Modello":"Fulvia","imageUrl":""}]"#);
        let records = decode(&code).unwrap();
        assert_eq!(records[0].year, "1972");
        assert_eq!(records[0].model_name, "Fulvia");
        assert_eq!(records[0].color, "");
        assert_eq!(records[0].image_url.as_deref(), Some(""));
    }

    #[test]
    fn test_non_string_image_url_dropped() {
        let code = STANDARD.encode(r#"[{"id":"a","imageUrl":42},{"id":"b","imageUrl":null}]"#);
        let records = decode(&code).unwrap();
        assert_eq!(records[0].image_url, None);
        assert_eq!(records[1].image_url, None);
    }
}
