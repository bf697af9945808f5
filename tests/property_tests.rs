/// Property-based tests using proptest
/// Tests invariants of the aggregation arithmetic, export formatting, and
/// the table view that should hold for all inputs.
use proptest::prelude::*;
use rust_console_api::export::{export_firms, ExportFormat, FLATTENED_FIELDS};
use rust_console_api::extraction::{add_row, parse_entries, recompute, EditPolicy};
use rust_console_api::models::{FirmOutput, FirmRecord, NumberRow, ResultSet};
use rust_console_api::table::TableView;

fn finite_numbers() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6f64, 0..20)
}

fn firm_named(name: &str, rating: Option<f64>) -> FirmRecord {
    FirmRecord {
        output: FirmOutput {
            firm_name: Some(name.to_string()),
            google_rating: rating,
            ..Default::default()
        },
    }
}

// Property: row-level recompute laws
proptest! {
    #[test]
    fn row_statistics_follow_from_numbers(numbers in finite_numbers()) {
        let row = NumberRow::new(numbers.clone());
        prop_assert_eq!(row.count, numbers.len());
        let sum: f64 = numbers.iter().sum();
        prop_assert!((row.sum - sum).abs() < 1e-6);
        if numbers.is_empty() {
            prop_assert_eq!(row.average, 0.0);
        } else {
            prop_assert!((row.average - sum / numbers.len() as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn set_aggregates_are_sums_of_rows(rows in prop::collection::vec(finite_numbers(), 0..8)) {
        let mut set = ResultSet::new();
        for numbers in rows {
            add_row(&mut set, numbers);
        }

        let total_count: usize = set.rows.iter().map(|r| r.count).sum();
        let grand_total: f64 = set.rows.iter().map(|r| r.sum).sum();
        prop_assert_eq!(set.total_count, total_count);
        prop_assert!((set.grand_total - grand_total).abs() < 1e-6);
        if total_count == 0 {
            prop_assert_eq!(set.overall_average, 0.0);
        } else {
            prop_assert!(
                (set.overall_average - grand_total / total_count as f64).abs() < 1e-6
            );
        }
    }

    #[test]
    fn recompute_is_idempotent(rows in prop::collection::vec(finite_numbers(), 0..8)) {
        let mut set = ResultSet::new();
        for numbers in rows {
            add_row(&mut set, numbers);
        }
        let before = set.clone();
        recompute(&mut set);
        prop_assert_eq!(set, before);
    }
}

// Property: edit-policy parsing
proptest! {
    #[test]
    fn lenient_parse_never_fails_and_never_keeps_zero(entries in prop::collection::vec("\\PC*", 0..10)) {
        let parsed = parse_entries(&entries, EditPolicy::Lenient).unwrap();
        prop_assert!(parsed.iter().all(|n| *n != 0.0));
    }

    #[test]
    fn strict_parse_keeps_every_numeric_entry(values in prop::collection::vec(-1000i32..1000i32, 0..10)) {
        let entries: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let parsed = parse_entries(&entries, EditPolicy::Strict).unwrap();
        let expected: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn strict_parse_drops_only_blank_entries(blanks in prop::collection::vec("[ \\t]*", 1..6)) {
        let parsed = parse_entries(&blanks, EditPolicy::Strict).unwrap();
        prop_assert!(parsed.is_empty());
    }
}

// Property: CSV export round-trips arbitrary field content
proptest! {
    #[test]
    fn csv_round_trips_any_firm_name(name in "\\PC{1,60}") {
        let record = firm_named(&name, None);
        let artifact = export_firms(&[record], ExportFormat::Csv, None).unwrap().unwrap();

        let mut reader = csv::Reader::from_reader(artifact.bytes.as_slice());
        let row = reader.records().next().unwrap().unwrap();
        prop_assert_eq!(row.get(0).unwrap(), name.as_str());
    }

    #[test]
    fn export_header_is_stable(count in 1usize..5) {
        let records: Vec<FirmRecord> = (0..count).map(|i| firm_named(&format!("f{}", i), None)).collect();
        let artifact = export_firms(&records, ExportFormat::Csv, None).unwrap().unwrap();
        let mut reader = csv::Reader::from_reader(artifact.bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        prop_assert_eq!(headers, FLATTENED_FIELDS.to_vec());
    }
}

// Property: table sorting and pagination
proptest! {
    #[test]
    fn missing_sort_values_always_land_last(ratings in prop::collection::vec(prop::option::of(0.0f64..5.0f64), 1..30)) {
        let records: Vec<FirmRecord> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| firm_named(&format!("f{}", i), *r))
            .collect();

        for passes in 1..=2 {
            let mut view = TableView::new(10);
            view.set_records(records.clone());
            for _ in 0..passes {
                view.toggle_sort("google_rating");
            }
            let sorted = view.sorted();
            let first_missing = sorted
                .iter()
                .position(|r| r.output.google_rating.is_none())
                .unwrap_or(sorted.len());
            prop_assert!(
                sorted[first_missing..].iter().all(|r| r.output.google_rating.is_none())
            );
        }
    }

    #[test]
    fn toggling_twice_reverses_fully_populated_lists(mut ratings in prop::collection::vec(0u32..1000u32, 2..20)) {
        ratings.sort_unstable();
        ratings.dedup();
        let records: Vec<FirmRecord> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| firm_named(&format!("f{}", i), Some(*r as f64)))
            .collect();

        let mut asc = TableView::new(10);
        asc.set_records(records.clone());
        asc.toggle_sort("google_rating");
        let ascending: Vec<Option<f64>> =
            asc.sorted().iter().map(|r| r.output.google_rating).collect();

        let mut desc = TableView::new(10);
        desc.set_records(records);
        desc.toggle_sort("google_rating");
        desc.toggle_sort("google_rating");
        let descending: Vec<Option<f64>> =
            desc.sorted().iter().map(|r| r.output.google_rating).collect();

        let mut reversed = ascending.clone();
        reversed.reverse();
        prop_assert_eq!(descending, reversed);
    }

    #[test]
    fn page_is_always_in_valid_range(
        initial in 0usize..50,
        requested in 0usize..50,
        shrink_to in 0usize..50,
    ) {
        let mut view = TableView::new(10);
        view.set_records((0..initial).map(|i| firm_named(&format!("f{}", i), None)).collect());
        view.set_page(requested);
        prop_assert!(view.page() >= 1 && view.page() <= view.total_pages());

        view.set_records((0..shrink_to).map(|i| firm_named(&format!("f{}", i), None)).collect());
        prop_assert!(view.page() >= 1 && view.page() <= view.total_pages());
    }

    #[test]
    fn pages_partition_the_sorted_order(count in 0usize..45) {
        let mut view = TableView::new(10);
        view.set_records((0..count).map(|i| firm_named(&format!("f{:03}", i), None)).collect());

        let mut seen = Vec::new();
        for page in 1..=view.total_pages() {
            view.set_page(page);
            for record in view.current_page() {
                seen.push(record.output.firm_name.clone().unwrap());
            }
        }
        let expected: Vec<String> = view
            .sorted()
            .iter()
            .map(|r| r.output.firm_name.clone().unwrap())
            .collect();
        prop_assert_eq!(seen, expected);
    }
}
