use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::trace;

use crate::column::{ColumnSet, FilterKind};
use crate::record::{FIELD_ORDER, Field, Record};
use crate::view::CaseSensitivity;

/// Substring matcher honouring the configured case sensitivity.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
    case: CaseSensitivity,
}

impl TextMatcher {
    pub fn new(needle: &str, case: CaseSensitivity) -> Self {
        let needle = match case {
            CaseSensitivity::Sensitive => needle.to_string(),
            CaseSensitivity::Insensitive => needle.to_lowercase(),
        };
        TextMatcher { needle, case }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        match self.case {
            CaseSensitivity::Sensitive => haystack.contains(&self.needle),
            CaseSensitivity::Insensitive => haystack.to_lowercase().contains(&self.needle),
        }
    }
}

enum ColumnPredicate {
    Contains(Field, TextMatcher),
    Equals(Field, String),
}

impl ColumnPredicate {
    fn matches(&self, record: &Record) -> bool {
        match self {
            ColumnPredicate::Contains(field, matcher) => matcher.matches(&record.display(*field)),
            ColumnPredicate::Equals(field, value) => record.display(*field) == value.as_str(),
        }
    }
}

// Filters of unknown or non filterable columns and "All" selections put no
// constraint on the rows and are dropped here.
fn column_predicates(
    column_filters: &BTreeMap<Field, String>,
    columns: &ColumnSet,
    case: CaseSensitivity,
) -> Vec<ColumnPredicate> {
    column_filters
        .iter()
        .filter_map(|(&field, value)| match columns.filter_kind(field)? {
            FilterKind::NoFilter => None,
            FilterKind::FreeText => Some(ColumnPredicate::Contains(
                field,
                TextMatcher::new(value, case),
            )),
            FilterKind::SingleSelect { .. } if value.is_empty() => None,
            FilterKind::SingleSelect { .. } => {
                Some(ColumnPredicate::Equals(field, value.clone()))
            }
        })
        .collect()
}

/// True if any field of the record contains the matcher's text.
pub fn matches_global(record: &Record, matcher: &TextMatcher) -> bool {
    FIELD_ORDER
        .iter()
        .any(|&field| matcher.matches(&record.display(field)))
}

/// Returns the indices of all records passing the global filter and every
/// active column filter, in record order.
pub fn apply(
    records: &[Record],
    global_filter: &str,
    column_filters: &BTreeMap<Field, String>,
    columns: &ColumnSet,
    case: CaseSensitivity,
) -> Vec<usize> {
    let start_time = Instant::now();
    let global = TextMatcher::new(global_filter, case);
    let predicates = column_predicates(column_filters, columns, case);

    let rows: Vec<usize> = (0..records.len())
        .into_par_iter()
        .filter(|&idx| {
            let record = &records[idx];
            matches_global(record, &global) && predicates.iter().all(|p| p.matches(record))
        })
        .collect();

    trace!(
        "Filter matched {} of {} records in {}ms",
        rows.len(),
        records.len(),
        start_time.elapsed().as_millis()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new(1, "Essence", "Essence Mascara Lash Princess", "beauty", 4.94, 9.99),
            Record::new(2, "Glamour Beauty", "Eyeshadow Palette", "beauty", 3.28, 19.99),
            Record::new(3, "Chanel", "Coco Noir Eau De", "fragrances", 4.26, 129.99),
            Record::new(4, "", "Apple", "groceries", 4.19, 1.99),
        ]
    }

    fn filters(entries: &[(Field, &str)]) -> BTreeMap<Field, String> {
        entries
            .iter()
            .map(|(f, v)| (*f, v.to_string()))
            .collect()
    }

    #[test]
    fn empty_global_filter_keeps_everything() {
        let rows = apply(
            &records(),
            "",
            &BTreeMap::new(),
            &ColumnSet::products(),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn global_filter_respects_case_sensitivity() {
        let columns = ColumnSet::products();
        let data = records();
        let none = BTreeMap::new();
        assert_eq!(
            apply(&data, "essence", &none, &columns, CaseSensitivity::Insensitive),
            vec![0]
        );
        assert!(apply(&data, "essence", &none, &columns, CaseSensitivity::Sensitive).is_empty());
        assert_eq!(
            apply(&data, "BEAUTY", &none, &columns, CaseSensitivity::Insensitive),
            vec![0, 1]
        );
    }

    #[test]
    fn global_filter_matches_numeric_fields() {
        let rows = apply(
            &records(),
            "129.9",
            &BTreeMap::new(),
            &ColumnSet::products(),
            CaseSensitivity::Sensitive,
        );
        assert_eq!(rows, vec![2]);
    }

    #[test]
    fn select_filter_is_an_exact_match() {
        let columns = ColumnSet::products();
        let data = records();
        let rows = apply(
            &data,
            "",
            &filters(&[(Field::Category, "beauty")]),
            &columns,
            CaseSensitivity::Insensitive,
        );
        assert_eq!(rows, vec![0, 1]);

        let rows = apply(
            &data,
            "",
            &filters(&[(Field::Category, "beaut")]),
            &columns,
            CaseSensitivity::Insensitive,
        );
        assert!(rows.is_empty());

        let rows = apply(
            &data,
            "",
            &filters(&[(Field::Category, "")]),
            &columns,
            CaseSensitivity::Insensitive,
        );
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn filters_are_combined_with_and() {
        let rows = apply(
            &records(),
            "Palette",
            &filters(&[(Field::Category, "beauty"), (Field::Brand, "glamour")]),
            &ColumnSet::products(),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(rows, vec![1]);
    }

    #[test]
    fn filters_on_non_filterable_columns_are_ignored() {
        let rows = apply(
            &records(),
            "",
            &filters(&[(Field::Price, "9.99")]),
            &ColumnSet::products(),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(rows.len(), 4);
    }
}
