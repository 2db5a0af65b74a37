//! Keyset conditions derived from a cursor
//!
//! [`cursor_conditions`] turns a pivot position into predicate groups meaning
//! "strictly after (or before) the pivot in sort order". For cursor fields
//! `k1..kn` (in sort order) group `i` requires `k1..k(i-1)` to equal the
//! pivot and `ki` to be strictly beyond it. The groups are alternatives:
//! a record qualifies if any one of them matches.
//!
//! [`merge_conditions`] folds those groups into an existing filter without
//! disturbing any disjunction the filter already had.
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::conditions::{cursor_conditions, merge_conditions, Direction};
//! use cursor_pagination::cursor::Cursor;
//! use cursor_pagination::filter::{FilterCondition, FilterExpr};
//! use cursor_pagination::sort::SortSpec;
//!
//! let sort = SortSpec::new().desc("date").asc("id");
//! let pivot = Cursor::new().with_field("date", 10_i64).with_field("id", "c");
//!
//! let groups = cursor_conditions(&pivot, &sort, Direction::Forward).unwrap();
//! assert_eq!(
//!     groups,
//!     vec![
//!         vec![FilterCondition::lt("date", 10_i64)],
//!         vec![FilterCondition::eq("date", 10_i64), FilterCondition::gt("id", "c")],
//!     ]
//! );
//!
//! let filter = merge_conditions(FilterExpr::all(), groups);
//! assert!(matches!(filter, FilterExpr::And(ref conjuncts) if conjuncts.len() == 1));
//! ```

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::filter::{FilterCondition, FilterExpr, FilterOperator};
use crate::sort::{SortDirection, SortSpec};

/// Which side of the pivot to select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Records after the pivot in sort order
    #[default]
    Forward,
    /// Records before the pivot in sort order
    Backward,
}

/// Derive the keyset predicate groups for `cursor` under `sort`
///
/// Only cursor fields take part; sort fields the cursor lacks are skipped.
/// An empty cursor yields no groups.
///
/// # Errors
///
/// Returns [`Error::CursorSortMismatch`] if the cursor holds a field that is
/// not in `sort`: without it the pivot has no well-defined position.
pub fn cursor_conditions(
    cursor: &Cursor,
    sort: &SortSpec,
    direction: Direction,
) -> Result<Vec<Vec<FilterCondition>>> {
    if let Some(field) = cursor.keys().find(|key| !sort.contains(key)) {
        return Err(Error::CursorSortMismatch {
            field: field.to_owned(),
        });
    }

    let pivot: Vec<_> = sort
        .iter()
        .filter_map(|(path, order)| cursor.get(path).map(|value| (path, order, value)))
        .collect();

    let groups = pivot
        .iter()
        .enumerate()
        .map(|(index, &(path, order, value))| {
            let mut group: Vec<FilterCondition> = pivot[..index]
                .iter()
                .map(|&(prior, _, prior_value)| FilterCondition::eq(prior, prior_value.clone()))
                .collect();
            group.push(FilterCondition::new(
                path,
                comparison(order, direction),
                value.clone(),
            ));
            group
        })
        .collect();

    Ok(groups)
}

const fn comparison(order: SortDirection, direction: Direction) -> FilterOperator {
    let forward = match order {
        SortDirection::Ascending => FilterOperator::GreaterThan,
        SortDirection::Descending => FilterOperator::LessThan,
    };
    match direction {
        Direction::Forward => forward,
        Direction::Backward => forward.inverted(),
    }
}

/// AND the cursor groups into `filter`
///
/// - no groups: `filter` is returned unchanged;
/// - one group: its conditions join the filter's top-level conjunction;
/// - several groups: their disjunction joins the top-level conjunction as a
///   new `Or`, next to (never merged with) any `Or` already there.
pub fn merge_conditions(filter: FilterExpr, groups: Vec<Vec<FilterCondition>>) -> FilterExpr {
    let mut groups: Vec<Vec<FilterCondition>> =
        groups.into_iter().filter(|group| !group.is_empty()).collect();

    let cursor_clause: Vec<FilterExpr> = match groups.len() {
        0 => return filter,
        1 => groups
            .pop()
            .map(|group| group.into_iter().map(FilterExpr::Condition).collect())
            .unwrap_or_default(),
        _ => vec![FilterExpr::Or(
            groups.into_iter().map(group_expression).collect(),
        )],
    };

    let mut conjuncts = filter.into_conjuncts();
    conjuncts.extend(cursor_clause);
    FilterExpr::And(conjuncts)
}

fn group_expression(mut group: Vec<FilterCondition>) -> FilterExpr {
    if group.len() == 1 {
        if let Some(condition) = group.pop() {
            return FilterExpr::Condition(condition);
        }
    }
    FilterExpr::And(group.into_iter().map(FilterExpr::Condition).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;

    fn pivot() -> Cursor {
        Cursor::new()
            .with_field("a", 1_i64)
            .with_field("b", 2_i64)
            .with_field("c", 3_i64)
    }

    #[test]
    fn test_single_field_ascending() {
        let sort = SortSpec::new().asc("id");
        let cursor = Cursor::new().with_field("id", "x");
        let groups = cursor_conditions(&cursor, &sort, Direction::Forward).unwrap();
        assert_eq!(groups, vec![vec![FilterCondition::gt("id", "x")]]);
    }

    #[test]
    fn test_multi_key_tie_break_groups() {
        let sort = SortSpec::new().asc("a").desc("b").asc("c");
        let groups = cursor_conditions(&pivot(), &sort, Direction::Forward).unwrap();
        assert_eq!(
            groups,
            vec![
                vec![FilterCondition::gt("a", 1_i64)],
                vec![FilterCondition::eq("a", 1_i64), FilterCondition::lt("b", 2_i64)],
                vec![
                    FilterCondition::eq("a", 1_i64),
                    FilterCondition::eq("b", 2_i64),
                    FilterCondition::gt("c", 3_i64),
                ],
            ]
        );
    }

    #[test]
    fn test_backward_inverts_every_comparison() {
        let sort = SortSpec::new().asc("a").desc("b").asc("c");
        let groups = cursor_conditions(&pivot(), &sort, Direction::Backward).unwrap();
        let operators: Vec<FilterOperator> = groups
            .iter()
            .map(|group| group.last().unwrap().operator)
            .collect();
        assert_eq!(
            operators,
            vec![
                FilterOperator::LessThan,
                FilterOperator::GreaterThan,
                FilterOperator::LessThan,
            ]
        );
        // equality prefixes are direction independent
        assert_eq!(groups[2][0], FilterCondition::eq("a", 1_i64));
    }

    #[test]
    fn test_follows_sort_order_not_cursor_order() {
        let sort = SortSpec::new().asc("a").asc("b");
        let cursor = Cursor::new().with_field("b", 2_i64).with_field("a", 1_i64);
        let groups = cursor_conditions(&cursor, &sort, Direction::Forward).unwrap();
        assert_eq!(groups[0], vec![FilterCondition::gt("a", 1_i64)]);
    }

    #[test]
    fn test_partial_cursor_skips_missing_sort_fields() {
        let sort = SortSpec::new().asc("a").asc("b").asc("c");
        let cursor = Cursor::new().with_field("a", 1_i64).with_field("c", 3_i64);
        let groups = cursor_conditions(&cursor, &sort, Direction::Forward).unwrap();
        assert_eq!(
            groups[1],
            vec![FilterCondition::eq("a", 1_i64), FilterCondition::gt("c", 3_i64)]
        );
    }

    #[test]
    fn test_cursor_field_outside_sort_is_rejected() {
        let sort = SortSpec::new().asc("a");
        let cursor = Cursor::new().with_field("a", 1_i64).with_field("body", "x");
        let err = cursor_conditions(&cursor, &sort, Direction::Forward).unwrap_err();
        assert!(matches!(err, Error::CursorSortMismatch { ref field } if field == "body"));
    }

    #[test]
    fn test_empty_cursor_has_no_groups() {
        let sort = SortSpec::new().asc("a");
        let groups = cursor_conditions(&Cursor::new(), &sort, Direction::Forward).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_merge_without_groups_is_identity() {
        let filter: FilterExpr = FilterCondition::eq("status", "open").into();
        assert_eq!(merge_conditions(filter.clone(), vec![]), filter);
        assert_eq!(merge_conditions(filter.clone(), vec![vec![]]), filter);
    }

    #[test]
    fn test_merge_single_group_joins_conjunction() {
        let filter = FilterExpr::and(vec![FilterCondition::eq("status", "open").into()]);
        let merged = merge_conditions(filter, vec![vec![FilterCondition::gt("id", "x")]]);
        assert_eq!(
            merged,
            FilterExpr::And(vec![
                FilterCondition::eq("status", "open").into(),
                FilterCondition::gt("id", "x").into(),
            ])
        );
    }

    #[test]
    fn test_merge_many_groups_without_existing_or() {
        let filter: FilterExpr = FilterCondition::eq("status", "open").into();
        let groups = vec![
            vec![FilterCondition::lt("date", 5_i64)],
            vec![FilterCondition::eq("date", 5_i64), FilterCondition::gt("id", "x")],
        ];
        let merged = merge_conditions(filter, groups);
        assert_eq!(
            merged,
            FilterExpr::And(vec![
                FilterCondition::eq("status", "open").into(),
                FilterExpr::Or(vec![
                    FilterCondition::lt("date", 5_i64).into(),
                    FilterExpr::And(vec![
                        FilterCondition::eq("date", 5_i64).into(),
                        FilterCondition::gt("id", "x").into(),
                    ]),
                ]),
            ])
        );
    }

    #[test]
    fn test_merge_keeps_existing_or_separate() {
        let existing_or = FilterExpr::or(vec![
            FilterCondition::eq("status", "open").into(),
            FilterCondition::eq("status", "pending").into(),
        ]);
        let existing_and = FilterExpr::and(vec![
            FilterCondition::eq("archived", false).into(),
            existing_or.clone(),
        ]);
        let groups = vec![
            vec![FilterCondition::lt("date", 5_i64)],
            vec![FilterCondition::eq("date", 5_i64), FilterCondition::gt("id", "x")],
        ];

        let FilterExpr::And(conjuncts) = merge_conditions(existing_and, groups) else {
            panic!("merge must produce a conjunction");
        };
        assert_eq!(conjuncts.len(), 3);
        assert_eq!(conjuncts[0], FilterExpr::from(FilterCondition::eq("archived", false)));
        assert_eq!(conjuncts[1], existing_or);
        assert!(matches!(conjuncts[2], FilterExpr::Or(ref alternatives) if alternatives.len() == 2));
    }

    #[test]
    fn test_merge_into_root_or() {
        let root_or = FilterExpr::or(vec![
            FilterCondition::eq("a", 1_i64).into(),
            FilterCondition::eq("b", 2_i64).into(),
        ]);
        let groups = vec![
            vec![FilterCondition::gt("x", 1_i64)],
            vec![FilterCondition::eq("x", 1_i64), FilterCondition::gt("y", 2_i64)],
        ];
        let FilterExpr::And(conjuncts) = merge_conditions(root_or.clone(), groups) else {
            panic!("merge must produce a conjunction");
        };
        assert_eq!(conjuncts[0], root_or);
        assert!(matches!(conjuncts[1], FilterExpr::Or(_)));
    }

    #[test]
    fn test_merge_values_are_cloned_from_cursor() {
        let sort = SortSpec::new().asc("n");
        let cursor = Cursor::new().with_field("n", FilterValue::Null);
        let groups = cursor_conditions(&cursor, &sort, Direction::Forward).unwrap();
        assert_eq!(groups[0][0].value, FilterValue::Null);
    }
}
