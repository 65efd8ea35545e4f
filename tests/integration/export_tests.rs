use super::fixtures::{people, write_people};
use dupecases::dataset::{read_csv_from, ColumnSpec};
use dupecases::duplicates::{process_duplicates, FinderConfig};
use dupecases::error::ExitCode;
use dupecases::output::{CsvOutput, JsonOutput, TextOutput};
use dupecases::statistics::{generate_statistics, StatisticsOptions};
use tempfile::TempDir;

fn name_match() -> (dupecases::duplicates::DuplicateResult, Vec<dupecases::statistics::Statistic>) {
    let result = process_duplicates(&people(), &FinderConfig::new(vec![ColumnSpec::new(1)]));
    let options = StatisticsOptions {
        sequence_count_enabled: true,
        ..StatisticsOptions::default()
    };
    let stats = generate_statistics(&result.primary_values, &result.sequence_values, &options);
    (result, stats)
}

#[test]
fn test_json_export_of_name_match() {
    let (result, stats) = name_match();
    let json: serde_json::Value =
        serde_json::from_str(&JsonOutput::new(&result, &stats, ExitCode::Success).to_json().unwrap())
            .unwrap();

    assert_eq!(json["summary"]["totalCases"], serde_json::json!(10));
    assert_eq!(json["summary"]["matchingGroups"], serde_json::json!(3));
    assert_eq!(json["summary"]["matchingCases"], serde_json::json!(6));
    assert_eq!(json["summary"]["matchingRate"], serde_json::json!(60.0));
    assert_eq!(json["result"]["reorderedData"].as_array().unwrap().len(), 11);
    assert_eq!(json["result"]["reorderedData"][4][0], serde_json::json!(105.0));
    assert_eq!(json["statistics"][1]["title"], serde_json::json!("MatchSequence Frequency"));
    assert_eq!(
        json["statistics"][0]["output"]["rows"][2],
        serde_json::json!({"label": "Total", "count": 10, "percent": "100.0"})
    );
}

#[test]
fn test_csv_export_reads_back() {
    let (result, _) = name_match();
    let text = CsvOutput::new(&result.reordered).with_delimiter(';').to_csv_string().unwrap();
    assert!(text.starts_with("ID;Name;Age;City\n101;John Smith;"));

    let back = read_csv_from(text.as_bytes(), ';').unwrap();
    assert_eq!(back, result.reordered);
}

#[test]
fn test_csv_export_to_file() {
    let dir = TempDir::new().unwrap();
    let source = write_people(dir.path());
    let target = dir.path().join("copy.csv");
    let data = dupecases::dataset::read_csv(&source, ',').unwrap();

    CsvOutput::new(&data).write_file(&target).unwrap();
    assert_eq!(dupecases::dataset::read_csv(&target, ',').unwrap(), data);
}

#[test]
fn test_text_report_lists_tables() {
    let (result, stats) = name_match();
    let matching = vec!["Name".to_string()];
    let text = TextOutput::new(&matching, &result.stats, &stats)
        .with_color(false)
        .render();
    assert!(text.contains("PrimaryLast Frequency"));
    assert!(text.contains("MatchSequence Frequency"));
    assert!(text.contains("Sequence 2"));
    assert!(!text.contains('\u{1b}'));
}
