//! Collection statistics: records grouped by one field
//!
//! Pure projections over a record slice. Nothing is cached, so callers always
//! see groups computed from the slice they pass in.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Field, Record};

/// Label of the group collecting blank values
pub const UNSPECIFIED_LABEL: &str = "unspecified";

/// Records sharing one value of the grouped field
#[derive(Debug, Clone, Serialize)]
pub struct Group<'a> {
    pub label: String,
    /// True for the group of blank values
    pub unspecified: bool,
    pub count: usize,
    /// Members in collection order
    pub records: Vec<&'a Record>,
}

/// Totals for the statistics landing page
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub categories: Vec<Field>,
}

/// Group `records` by the trimmed value of `field`.
///
/// Groups are ordered by descending size. Equal-size groups are ordered by
/// label (byte order), with the unspecified group after all labelled ones.
pub fn group_by(records: &[Record], field: Field) -> Vec<Group<'_>> {
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for record in records {
        let value = record.get(field).trim();
        let key = (!value.is_empty()).then_some(value);

        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                label: key.unwrap_or(UNSPECIFIED_LABEL).to_string(),
                unspecified: key.is_none(),
                count: 0,
                records: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.records.push(record);
    }

    groups.sort_by(compare_groups);
    groups
}

fn compare_groups(a: &Group<'_>, b: &Group<'_>) -> Ordering {
    b.count
        .cmp(&a.count)
        .then(a.unspecified.cmp(&b.unspecified))
        .then_with(|| a.label.cmp(&b.label))
}

pub fn summary(records: &[Record]) -> Summary {
    Summary {
        total: records.len(),
        categories: Field::REPORT_CATEGORIES.to_vec(),
    }
}
