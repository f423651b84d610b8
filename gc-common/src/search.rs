//! Free-text filter used by the collection view

use crate::model::{Field, Record};

/// Fields the search box looks at
pub const SEARCH_FIELDS: [Field; 3] = [Field::ModelName, Field::CarBrand, Field::Year];

/// Case-insensitive substring match against model name, car brand and year.
/// A blank term matches everything.
pub fn matches(record: &Record, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || SEARCH_FIELDS
            .iter()
            .any(|&field| record.get(field).to_lowercase().contains(&term))
}

/// Records matching `term`, in collection order
pub fn filter<'a>(records: &'a [Record], term: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| matches(r, term)).collect()
}
