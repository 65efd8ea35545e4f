use super::fixtures::people;
use dupecases::dataset::{Cell, ColumnSpec};
use dupecases::duplicates::{
    process_duplicates, FinderConfig, PrimarySelection, SortDirection,
};
use dupecases::statistics::{generate_statistics, StatisticsOptions};

const ID: usize = 0;
const NAME: usize = 1;
const AGE: usize = 2;
const CITY: usize = 3;

fn cols(indices: &[usize]) -> Vec<ColumnSpec> {
    indices.iter().map(|&i| ColumnSpec::new(i)).collect()
}

#[test]
fn test_match_name_age_city_primary_last() {
    let config = FinderConfig::new(cols(&[NAME, AGE, CITY]))
        .with_primary_selection(PrimarySelection::Last);
    let result = process_duplicates(&people(), &config);

    assert_eq!(result.primary_values, vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(result.sequence_values, vec![1, 1, 0, 0, 2, 0, 0, 2, 0, 0]);
    assert_eq!(result.stats.duplicate_groups, 2);
    assert_eq!(result.stats.matching_rows, 4);
}

#[test]
fn test_match_name_age_primary_first() {
    let config = FinderConfig::new(cols(&[NAME, AGE]))
        .with_primary_selection(PrimarySelection::First);
    let result = process_duplicates(&people(), &config);

    assert_eq!(result.primary_values, vec![1, 1, 1, 1, 0, 1, 1, 0, 1, 0]);
    assert_eq!(result.sequence_values, vec![1, 1, 1, 0, 2, 0, 0, 2, 0, 2]);
}

#[test]
fn test_sort_by_id_descending_primary_first() {
    let config = FinderConfig::new(cols(&[NAME, AGE]))
        .with_sorting(cols(&[ID]))
        .with_sort_direction(SortDirection::Descending)
        .with_primary_selection(PrimarySelection::First);
    let result = process_duplicates(&people(), &config);

    // Highest ID in each group is primary and gets sequence 1
    assert_eq!(result.primary_values, vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(result.sequence_values, vec![2, 2, 2, 0, 1, 0, 0, 1, 0, 1]);
}

#[test]
fn test_match_name_reorders_matching_first() {
    let data = people();
    let config = FinderConfig::new(cols(&[NAME]));
    let result = process_duplicates(&data, &config);

    assert_eq!(result.sequence_values, vec![1, 1, 1, 0, 2, 0, 0, 2, 0, 2]);
    assert_eq!(result.order, vec![0, 1, 2, 4, 7, 9, 3, 5, 6, 8]);

    let reordered = &result.reordered;
    assert_eq!(reordered.header(), data.header());
    assert_eq!(reordered.body_len(), 10);
    let ids: Vec<String> = reordered
        .body()
        .iter()
        .map(|row| row[ID].key_string())
        .collect();
    assert_eq!(
        ids,
        vec!["101", "102", "103", "105", "108", "110", "104", "106", "107", "109"]
    );
}

#[test]
fn test_statistics_for_name_match() {
    let result = process_duplicates(&people(), &FinderConfig::new(cols(&[NAME])));
    let options = StatisticsOptions {
        sequence_count_enabled: true,
        ..StatisticsOptions::default()
    };
    let stats = generate_statistics(&result.primary_values, &result.sequence_values, &options);
    assert_eq!(stats.len(), 2);

    let primary: Vec<(&str, usize, &str)> = stats[0]
        .output
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.count, r.percent.as_str()))
        .collect();
    assert_eq!(
        primary,
        vec![
            ("Duplicate case", 3, "30.0"),
            ("Primary case", 7, "70.0"),
            ("Total", 10, "100.0"),
        ]
    );

    let sequence: Vec<(&str, usize)> = stats[1]
        .output
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.count))
        .collect();
    assert_eq!(
        sequence,
        vec![
            ("Non-matching case", 4),
            ("Sequence 1", 3),
            ("Sequence 2", 3),
            ("Total", 10),
        ]
    );
}

#[test]
fn test_number_and_text_cells_match() {
    let mut data = people();
    // Same age stored as text on one row, as a number on the other
    assert!(data.set_cell(4, AGE, Cell::from("34")));
    assert_eq!(data.cell(0, AGE), Some(&Cell::from(34.0)));
    let result = process_duplicates(&data, &FinderConfig::new(cols(&[NAME, AGE])));
    assert_eq!(result.sequence_values[0], 1);
    assert_eq!(result.sequence_values[4], 2);
}
