//! Spreadsheet row importer
//!
//! Converts loosely-typed rows (column label → arbitrary JSON value), as
//! produced by the browser's spreadsheet parser, into canonical [`Record`]s.
//! The loose row shape never leaves this module: callers get records or an
//! [`ImportError`].

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{Field, Record};
use crate::placeholder::{PlaceholderImages, CARD_SIZE};
use crate::{Error, Result};

/// One parsed spreadsheet row, keyed by (untrimmed) column header
pub type RawRow = Map<String, Value>;

/// Reasons a whole import batch is rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The sheet had no data rows
    #[error("the table is empty")]
    EmptyTable,

    /// The payload is not a list of rows
    #[error("unreadable table: {0}")]
    Unparseable(String),
}

/// Turns raw rows into records with fresh ids and placeholder images
#[derive(Debug, Clone, Default)]
pub struct Importer {
    placeholders: PlaceholderImages,
}

impl Importer {
    pub fn new(placeholders: PlaceholderImages) -> Self {
        Self { placeholders }
    }

    /// Accept a parsed JSON payload as a row list.
    ///
    /// The payload must be an array. Elements that are not objects are kept
    /// as empty rows so one bad row cannot abort the batch.
    pub fn parse_rows(payload: Value) -> std::result::Result<Vec<RawRow>, ImportError> {
        match payload {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => map,
                    other => {
                        debug!(row = %other, "Non-object row imported as empty");
                        RawRow::new()
                    }
                })
                .collect()),
            other => Err(ImportError::Unparseable(format!(
                "expected a list of rows, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Import a batch of rows, preserving input order.
    ///
    /// Fails only when `rows` is empty; malformed cells degrade to `""`.
    pub fn import_rows(&self, rows: &[RawRow]) -> std::result::Result<Vec<Record>, ImportError> {
        if rows.is_empty() {
            return Err(ImportError::EmptyTable);
        }

        let ids = BatchIds::new("import");
        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.record_from_row(ids.id(index), row))
            .collect();

        info!(count = records.len(), batch = %ids.prefix, "Imported spreadsheet rows");
        Ok(records)
    }

    fn record_from_row(&self, id: String, row: &RawRow) -> Record {
        let normalized = normalize_keys(row);
        let mut record = fill_fields(Record::new(id), &normalized);

        let seed = if record.model_name.is_empty() {
            record.id.as_str()
        } else {
            record.model_name.as_str()
        };
        record.image_url = Some(self.placeholders.url(seed, CARD_SIZE));
        record
    }

    /// Build a record from a manual entry form.
    ///
    /// The model name is mandatory; every other field may be left blank.
    pub fn manual_record(&self, form: &RawRow) -> Result<Record> {
        let normalized = normalize_keys(form);
        let record = fill_fields(Record::new(manual_id()), &normalized);

        if record.model_name.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} is required",
                Field::ModelName.label()
            )));
        }

        let image_url = self.placeholders.url(&record.id, CARD_SIZE);
        Ok(Record {
            image_url: Some(image_url),
            ..record
        })
    }
}

/// Id source for one import batch: `<kind>-<unix millis>-<batch tag>-<row>`
struct BatchIds {
    prefix: String,
}

impl BatchIds {
    fn new(kind: &str) -> Self {
        let tag = Uuid::new_v4().simple().to_string();
        Self {
            prefix: format!("{}-{}-{}", kind, Utc::now().timestamp_millis(), &tag[..8]),
        }
    }

    fn id(&self, index: usize) -> String {
        format!("{}-{}", self.prefix, index)
    }
}

/// `manual-<unix millis>-<5 base-36 chars>`
fn manual_id() -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(5);
    for _ in 0..5 {
        suffix.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    format!("manual-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Index a row by trimmed column name; later duplicates win.
pub(crate) fn normalize_keys(row: &RawRow) -> HashMap<&str, &Value> {
    let mut normalized = HashMap::with_capacity(row.len());
    for (key, value) in row {
        normalized.insert(key.trim(), value);
    }
    normalized
}

/// Copy the 17 canonical fields from a normalized row into `record`.
pub(crate) fn fill_fields(record: Record, normalized: &HashMap<&str, &Value>) -> Record {
    Field::ALL.into_iter().fold(record, |record, field| {
        let value = normalized
            .get(field.label())
            .map(|v| coerce_cell(v))
            .unwrap_or_default();
        record.with(field, value)
    })
}

/// Render a spreadsheet cell as field text.
///
/// Null and structured values are treated as blank. Whole-number floats print
/// without a fractional part, matching how spreadsheets display them.
pub fn coerce_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f == 0.0 => "0".to_string(),
                    Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                        format!("{:.0}", f)
                    }
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<RawRow> {
        Importer::parse_rows(value).unwrap()
    }

    #[test]
    fn test_fiat_500_example() {
        let importer = Importer::default();
        let input = rows(json!([
            { "Modello": "500", "Marca della macchina": "Fiat", "Anno": "1965" }
        ]));

        let records = importer.import_rows(&input).unwrap();
        assert_eq!(records.len(), 1);

        let car = &records[0];
        assert_eq!(car.model_name, "500");
        assert_eq!(car.car_brand, "Fiat");
        assert_eq!(car.year, "1965");
        let blank = car.fields().filter(|(_, v)| v.is_empty()).count();
        assert_eq!(blank, 14);
        assert_eq!(
            car.image_url.as_deref(),
            Some("https://picsum.photos/seed/500/400/300")
        );
    }

    #[test]
    fn test_keys_are_trimmed() {
        let importer = Importer::default();
        let input = rows(json!([{ "  Modello ": "Stratos", "Scala\t": "1/43" }]));

        let car = &importer.import_rows(&input).unwrap()[0];
        assert_eq!(car.model_name, "Stratos");
        assert_eq!(car.scale, "1/43");
    }

    #[test]
    fn test_duplicate_trimmed_keys_last_wins() {
        let importer = Importer::default();
        let input = rows(json!([{ "Colore": "Rosso", "Colore ": "Blu" }]));

        let car = &importer.import_rows(&input).unwrap()[0];
        assert_eq!(car.color, "Blu");
    }

    #[test]
    fn test_numbers_and_blanks_are_coerced() {
        let importer = Importer::default();
        let input = rows(json!([{
            "Anno": 1965,
            "Numero": 7.0,
            "Fascicolo": 12.5,
            "Codice": null,
            "Tema": "",
            "Stato": true,
            "Osservazione": ["a", "b"],
            "Unknown column": "ignored"
        }]));

        let car = &importer.import_rows(&input).unwrap()[0];
        assert_eq!(car.year, "1965");
        assert_eq!(car.number, "7");
        assert_eq!(car.issue, "12.5");
        assert_eq!(car.code, "");
        assert_eq!(car.theme, "");
        assert_eq!(car.status, "true");
        assert_eq!(car.remark, "");
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        assert_eq!(coerce_cell(&json!(-0.0)), "0");
        assert_eq!(coerce_cell(&json!(0.0)), "0");
        assert_eq!(coerce_cell(&json!(-3.0)), "-3");
    }

    #[test]
    fn test_placeholder_seeded_by_id_without_model() {
        let importer = Importer::default();
        let input = rows(json!([{ "Anno": "1970" }]));

        let car = &importer.import_rows(&input).unwrap()[0];
        let expected = PlaceholderImages::default().url(&car.id, CARD_SIZE);
        assert_eq!(car.image_url.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_ids_unique_and_order_preserved() {
        let importer = Importer::default();
        let input = rows(json!([
            { "Modello": "A" }, { "Modello": "B" }, { "Modello": "C" }
        ]));

        let first = importer.import_rows(&input).unwrap();
        let second = importer.import_rows(&input).unwrap();

        let names: Vec<&str> = first.iter().map(|r| r.model_name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);

        let ids: std::collections::HashSet<&str> =
            first.iter().chain(second.iter()).map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 6);
        assert!(first.iter().all(|r| r.id.starts_with("import-")));
    }

    #[test]
    fn test_output_has_exact_key_set() {
        let importer = Importer::default();
        let input = rows(json!([{ "Modello": "Delta", "Extra": 1 }, {}]));

        for record in importer.import_rows(&input).unwrap() {
            let value = serde_json::to_value(&record).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 19);
            assert!(object.contains_key("id"));
            assert!(object.contains_key("imageUrl"));
            for field in Field::ALL {
                assert!(object[field.label()].is_string());
            }
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        let importer = Importer::default();
        assert_eq!(importer.import_rows(&[]), Err(ImportError::EmptyTable));
    }

    #[test]
    fn test_non_array_payload_rejected() {
        let err = Importer::parse_rows(json!({ "Modello": "500" })).unwrap_err();
        assert!(matches!(err, ImportError::Unparseable(_)));
    }

    #[test]
    fn test_non_object_row_becomes_blank_record() {
        let importer = Importer::default();
        let input = rows(json!([42, { "Modello": "Uno" }]));

        let records = importer.import_rows(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].fields().all(|(_, v)| v.is_empty()));
        assert_eq!(records[1].model_name, "Uno");
    }

    #[test]
    fn test_manual_record_requires_model_name() {
        let importer = Importer::default();
        let form = rows(json!([{ "Modello": "  ", "Anno": "1980" }])).remove(0);

        let err = importer.manual_record(&form).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_manual_record_uses_id_seeded_placeholder() {
        let importer = Importer::default();
        let form = rows(json!([{ "Modello": "Countach", "Scala": "1/18" }])).remove(0);

        let car = importer.manual_record(&form).unwrap();
        assert!(car.id.starts_with("manual-"));
        assert_eq!(car.id.rsplit('-').next().unwrap().len(), 5);
        assert_eq!(car.scale, "1/18");
        assert_eq!(
            car.image_url,
            Some(PlaceholderImages::default().url(&car.id, CARD_SIZE))
        );
    }
}
