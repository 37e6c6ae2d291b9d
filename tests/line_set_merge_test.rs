//! Property tests for line set aggregation
//!
//! Concurrent submission tasks finish in arbitrary order, so merging must
//! not depend on how the partial results are grouped.

use chrono::{TimeZone, Utc};
use formcast::core::csv::{Line, LineSet};
use formcast::domain::LineSetError;
use proptest::prelude::*;

fn line_strategy() -> impl Strategy<Value = Line> {
    ("[a-e]", proptest::option::of(0i64..5), "[a-z]{0,6}").prop_map(|(id, day, text)| {
        let date = day.and_then(|d| Utc.timestamp_opt(1_700_000_000 + d * 86_400, 0).single());
        Line::new(format!("uuid:{id}"), date, text)
    })
}

fn set_strategy() -> impl Strategy<Value = LineSet> {
    proptest::collection::vec(line_strategy(), 0..5).prop_map(|lines| LineSet::of("data", lines))
}

proptest! {
    #[test]
    fn merge_is_associative(a in set_strategy(), b in set_strategy(), c in set_strategy()) {
        let left = a.clone().merge(b.clone()).unwrap().merge(c.clone()).unwrap();
        let right = a.merge(b.merge(c).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_keeps_every_line(a in set_strategy(), b in set_strategy()) {
        let total = a.len() + b.len();
        let merged = a.merge(b).unwrap();
        prop_assert_eq!(merged.len(), total);
        prop_assert_eq!(merged.sorted().len(), total);
    }

    #[test]
    fn last_line_is_most_recent(a in set_strategy(), b in set_strategy()) {
        let merged = a.merge(b).unwrap();
        match merged.last_line() {
            None => prop_assert!(merged.is_empty()),
            Some(last) => {
                for line in merged.unsorted() {
                    prop_assert!(
                        (line.submission_date, &line.instance_id)
                            <= (last.submission_date, &last.instance_id)
                    );
                }
            }
        }
    }

    #[test]
    fn sorted_is_chronological(a in set_strategy()) {
        let sorted = a.sorted();
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].submission_date <= pair[1].submission_date);
        }
    }

    #[test]
    fn empty_is_neutral(a in set_strategy()) {
        prop_assert_eq!(LineSet::empty().merge(a.clone()).unwrap(), a.clone());
        prop_assert_eq!(a.clone().merge(LineSet::empty()).unwrap(), a);
    }
}

#[test]
fn test_merging_untagged_sets_fails() {
    let error = LineSet::empty().merge(LineSet::empty()).unwrap_err();
    assert!(matches!(error, LineSetError::BothUntagged));
}

#[test]
fn test_merging_different_files_fails() {
    let error = LineSet::of("data", vec![])
        .merge(LineSet::of("people", vec![]))
        .unwrap_err();
    match error {
        LineSetError::FqnMismatch { left, right } => {
            assert_eq!(left, "data");
            assert_eq!(right, "people");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_undated_lines_sort_first() {
    let dated = Line::new(
        "uuid:a",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        "dated",
    );
    let undated = Line::new("uuid:b", None, "undated");
    let set = LineSet::of("data", vec![dated, undated]);

    let texts: Vec<_> = set.sorted().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["undated", "dated"]);
    assert_eq!(set.last_line().map(|l| l.text.as_str()), Some("dated"));
}
