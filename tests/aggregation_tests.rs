/// Tests for the row editor / aggregator and model-reply parsing.
/// Exercises the console scenarios end to end against the pure domain functions.
use rust_console_api::errors::AppError;
use rust_console_api::extraction::{
    add_row, delete_row, edit_row, parse_entries, parse_model_reply, recompute,
    strip_code_fences, EditPolicy,
};
use rust_console_api::models::{NumberRow, ResultSet};

fn entries(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn model_reply_scenario_matches_summary_tiles() {
    let reply = r#"{"rows":[{"numbers":[1,2,3],"count":3,"sum":6,"average":2}],"grand_total":6,"total_count":3,"overall_average":2}"#;
    let set = parse_model_reply(reply).unwrap();

    assert_eq!(set.rows.len(), 1);
    assert_eq!(set.rows[0].numbers, vec![1.0, 2.0, 3.0]);
    assert_eq!(set.rows[0].count, 3);
    assert_eq!(set.rows[0].sum, 6.0);
    assert_eq!(set.rows[0].average, 2.0);
    assert_eq!(set.total_count, 3);
    assert_eq!(set.grand_total, 6.0);
    assert_eq!(set.overall_average, 2.0);
}

#[test]
fn fenced_model_reply_parses() {
    let reply = "```json\n{\"rows\":[{\"numbers\":[5,5]}]}\n```";
    let set = parse_model_reply(reply).unwrap();
    assert_eq!(set.rows[0].sum, 10.0);
    assert_eq!(set.overall_average, 5.0);
}

#[test]
fn fence_stripping_handles_untagged_fences() {
    assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
}

#[test]
fn lenient_edit_scenario_coerces_and_drops_zeros() {
    let mut set = parse_model_reply(
        r#"{"rows":[{"numbers":[1,2,3]}],"grand_total":6}"#,
    )
    .unwrap();

    // "x" coerces to 0, then every zero is filtered out on save.
    edit_row(&mut set, 0, &entries(&["4", "x", "0"]), EditPolicy::Lenient).unwrap();

    assert_eq!(set.rows[0].numbers, vec![4.0]);
    assert_eq!(set.rows[0].count, 1);
    assert_eq!(set.rows[0].sum, 4.0);
    assert_eq!(set.rows[0].average, 4.0);
    assert_eq!(set.total_count, 1);
    assert_eq!(set.grand_total, 4.0);
    assert_eq!(set.overall_average, 4.0);
}

#[test]
fn strict_edit_rejects_unparsable_entries_by_name() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![1.0]);

    let err = edit_row(&mut set, 0, &entries(&["4", "x", "0"]), EditPolicy::Strict).unwrap_err();
    match err {
        AppError::BadRequest(msg) => assert!(msg.contains('x'), "message was: {}", msg),
        other => panic!("expected BadRequest, got {:?}", other),
    }
    // A rejected edit leaves the row untouched.
    assert_eq!(set.rows[0].numbers, vec![1.0]);
}

#[test]
fn strict_edit_keeps_zero_and_treats_blank_as_deletion() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![1.0, 2.0, 3.0]);

    edit_row(&mut set, 0, &entries(&["4", "", "0"]), EditPolicy::Strict).unwrap();

    assert_eq!(set.rows[0].numbers, vec![4.0, 0.0]);
    assert_eq!(set.rows[0].count, 2);
    assert_eq!(set.rows[0].sum, 4.0);
    assert_eq!(set.rows[0].average, 2.0);
}

#[test]
fn lenient_edit_can_empty_a_row_without_removing_it() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![7.0]);
    add_row(&mut set, vec![2.0]);

    edit_row(&mut set, 0, &entries(&["0", "abc"]), EditPolicy::Lenient).unwrap();

    assert_eq!(set.rows.len(), 2);
    assert!(set.rows[0].numbers.is_empty());
    assert_eq!(set.rows[0].average, 0.0);
    assert_eq!(set.total_count, 1);
    assert_eq!(set.grand_total, 2.0);
}

#[test]
fn deleting_last_row_clears_the_set() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![1.0, 2.0]);
    add_row(&mut set, vec![3.0]);

    delete_row(&mut set, 1).unwrap();
    assert_eq!(set.rows.len(), 1);
    assert_eq!(set.grand_total, 3.0);

    delete_row(&mut set, 0).unwrap();
    assert_eq!(set, ResultSet::new());
}

#[test]
fn delete_out_of_range_is_rejected() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![1.0]);
    assert!(delete_row(&mut set, 5).is_err());
}

#[test]
fn edit_out_of_range_is_rejected() {
    let mut set = ResultSet::new();
    assert!(edit_row(&mut set, 0, &entries(&["1"]), EditPolicy::Strict).is_err());
}

#[test]
fn recompute_is_idempotent() {
    let mut set = ResultSet::new();
    add_row(&mut set, vec![1.5, 2.5]);
    add_row(&mut set, vec![10.0]);

    let before = set.clone();
    recompute(&mut set);
    assert_eq!(set, before);
}

#[test]
fn recompute_fixes_inconsistent_derived_fields() {
    let mut set = ResultSet {
        rows: vec![NumberRow {
            numbers: vec![2.0, 4.0],
            count: 99,
            sum: -1.0,
            average: 42.0,
        }],
        total_count: 0,
        grand_total: 0.0,
        overall_average: 7.0,
    };
    recompute(&mut set);

    assert_eq!(set.rows[0].count, 2);
    assert_eq!(set.rows[0].sum, 6.0);
    assert_eq!(set.rows[0].average, 3.0);
    assert_eq!(set.total_count, 2);
    assert_eq!(set.grand_total, 6.0);
    assert_eq!(set.overall_average, 3.0);
}

#[test]
fn empty_set_has_zero_aggregates() {
    let set = ResultSet::new();
    assert_eq!(set.total_count, 0);
    assert_eq!(set.grand_total, 0.0);
    assert_eq!(set.overall_average, 0.0);
}

#[test]
fn lenient_parse_never_fails() {
    let parsed = parse_entries(&entries(&["", "abc", "-3", "0", "2.5"]), EditPolicy::Lenient)
        .unwrap();
    assert_eq!(parsed, vec![-3.0, 2.5]);
}
