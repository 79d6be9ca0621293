// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Free-text filtering and stable sorting over in-memory records.

use std::cmp::Ordering;

use crate::SortDirection;

/// Records whose fields can be read as raw strings by the query engine.
pub trait Searchable {
    type Field: Copy;

    fn field_value(&self, field: Self::Field) -> Option<&str>;
}

/// Records where at least one of `fields` contains `term`, ignoring case.
///
/// An empty term matches every record. A record lacking a field simply does
/// not match on that field.
pub fn filter<'a, T: Searchable>(records: &'a [T], term: &str, fields: &[T::Field]) -> Vec<&'a T> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            fields.iter().any(|field| {
                record
                    .field_value(*field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// Stable sort by the raw string at `key`.
///
/// Absent values order before present ones, so they lead an ascending sort and
/// trail a descending one. Equal keys keep their input order either way.
pub fn sort<T: Searchable>(records: &mut [&T], key: T::Field, direction: SortDirection) {
    records.sort_by(|left, right| {
        let ordering = compare_values(left.field_value(key), right.field_value(key));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_values(left: Option<&str>, right: Option<&str>) -> Ordering {
    left.cmp(&right)
}

#[cfg(test)]
mod tests {
    use super::{Searchable, filter, sort};
    use crate::SortDirection;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        name: Option<&'static str>,
        code: Option<&'static str>,
    }

    #[derive(Debug, Clone, Copy)]
    enum Col {
        Name,
        Code,
    }

    impl Searchable for Row {
        type Field = Col;

        fn field_value(&self, field: Col) -> Option<&str> {
            match field {
                Col::Name => self.name,
                Col::Code => self.code,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: Some("Bravo"),
                code: Some("X-1"),
            },
            Row {
                id: 2,
                name: None,
                code: Some("alpha-7"),
            },
            Row {
                id: 3,
                name: Some("Alpha"),
                code: None,
            },
            Row {
                id: 4,
                name: Some("Bravo"),
                code: Some("Z"),
            },
        ]
    }

    fn ids(records: &[&Row]) -> Vec<u32> {
        records.iter().map(|row| row.id).collect()
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let rows = rows();
        let matched = filter(&rows, "ALPHA", &[Col::Name, Col::Code]);
        assert_eq!(ids(&matched), vec![2, 3]);
    }

    #[test]
    fn filter_skips_missing_fields_without_failing() {
        let rows = rows();
        let matched = filter(&rows, "a", &[Col::Name]);
        assert_eq!(ids(&matched), vec![1, 3, 4]);
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let rows = rows();
        assert_eq!(ids(&filter(&rows, "", &[Col::Name])), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filter_result_is_exactly_the_matching_set() {
        let rows = rows();
        for term in ["", "a", "br", "-", "z", "nothing"] {
            let matched = filter(&rows, term, &[Col::Name, Col::Code]);
            let expected: Vec<u32> = rows
                .iter()
                .filter(|row| {
                    [row.name, row.code]
                        .into_iter()
                        .flatten()
                        .any(|value| value.to_lowercase().contains(&term.to_lowercase()))
                })
                .map(|row| row.id)
                .collect();
            assert_eq!(ids(&matched), expected, "term {term:?}");
        }
    }

    #[test]
    fn sort_is_stable_and_places_missing_first_ascending() {
        let rows = rows();
        let mut view: Vec<&Row> = rows.iter().collect();
        sort(&mut view, Col::Name, SortDirection::Asc);
        assert_eq!(ids(&view), vec![2, 3, 1, 4]);
    }

    #[test]
    fn sort_descending_mirrors_and_keeps_ties_in_input_order() {
        let rows = rows();
        let mut view: Vec<&Row> = rows.iter().collect();
        sort(&mut view, Col::Name, SortDirection::Desc);
        assert_eq!(ids(&view), vec![1, 4, 3, 2]);
    }

    #[test]
    fn adjacent_pairs_respect_the_order() {
        let rows = rows();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let mut view: Vec<&Row> = rows.iter().collect();
            sort(&mut view, Col::Code, direction);
            for pair in view.windows(2) {
                let (left, right) = (pair[0].code, pair[1].code);
                match direction {
                    SortDirection::Asc => assert!(left <= right),
                    SortDirection::Desc => assert!(left >= right),
                }
            }
        }
    }
}
