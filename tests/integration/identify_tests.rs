use super::fixtures::people;
use dupecases::actions::identify::{
    identify_duplicates, IdentifyError, IdentifyOutcome, IdentifyRequest, ANALYTIC_TITLE,
};
use dupecases::dataset::{Cell, VariableKind};
use dupecases::duplicates::{PrimarySelection, SortDirection};
use dupecases::store::{CaseStore, LogEntry, MemoryLog, MemoryStore, StoreError};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn column(store: &MemoryStore, name: &str) -> Vec<String> {
    let index = store.dataset().column_index(name).unwrap();
    (0..store.dataset().body_len())
        .map(|row| store.dataset().cell(row, index).unwrap().key_string())
        .collect()
}

#[test]
fn test_identify_moves_matching_cases_to_top() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let mut request = IdentifyRequest::new(names(&["Name"]));
    request.sequence_count_enabled = true;

    let outcome = identify_duplicates(&mut store, &mut log, &request, None).unwrap();
    assert!(outcome.has_duplicates());

    assert_eq!(
        column(&store, "ID"),
        vec!["101", "102", "103", "105", "108", "110", "104", "106", "107", "109"]
    );
    // Indicators follow their rows into the new order
    assert_eq!(
        column(&store, "PrimaryLast"),
        vec!["0", "0", "0", "1", "1", "1", "1", "1", "1", "1"]
    );
    assert_eq!(
        column(&store, "MatchSequence"),
        vec!["1", "1", "1", "2", "2", "2", "0", "0", "0", "0"]
    );

    let summary = outcome.summary().unwrap();
    assert!(summary.moved_to_top);
    assert_eq!(summary.primary_column, 4);
    assert_eq!(summary.sequence_column, Some(5));
    // Engine vectors stay in the original order
    assert_eq!(summary.result.sequence_values, vec![1, 1, 1, 0, 2, 0, 0, 2, 0, 2]);
}

#[test]
fn test_identify_keeps_order_and_sorts_groups() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let mut request = IdentifyRequest::new(names(&["Name", "Age"]));
    request.sorting = names(&["ID"]);
    request.sort_direction = SortDirection::Descending;
    request.primary_selection = PrimarySelection::First;
    request.move_matching_to_top = false;

    identify_duplicates(&mut store, &mut log, &request, None).unwrap();

    assert_eq!(column(&store, "ID")[0], "101");
    assert_eq!(
        column(&store, "PrimaryFirst"),
        vec!["0", "0", "0", "1", "1", "1", "1", "1", "1", "1"]
    );
    assert!(store.dataset().column_index("MatchSequence").is_none());
}

#[test]
fn test_identify_writes_variable_metadata_and_log() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let mut request = IdentifyRequest::new(names(&["Name", "Age", "City"]));
    request.sequence_count_enabled = true;
    request.sequence_indicator_name = "DupSeq".to_string();
    request.primary_indicator_name = Some("Keep".to_string());

    identify_duplicates(&mut store, &mut log, &request, None).unwrap();

    let keep = store.variable("Keep").unwrap();
    assert_eq!(keep.kind, VariableKind::Numeric);
    assert_eq!(keep.value_labels.get(&0).map(String::as_str), Some("Duplicate case"));
    assert_eq!(keep.value_labels.get(&1).map(String::as_str), Some("Primary case"));
    let seq = store.variable("DupSeq").unwrap();
    assert_eq!(seq.value_labels.len(), 1);

    let entries = log.entries();
    assert_eq!(entries.len(), 4);
    match &entries[0] {
        LogEntry::Log { text, .. } => {
            assert!(text.contains("/MATCH=Name Age City"));
            assert!(text.contains("/SEQUENCE=DupSeq"));
        }
        other => panic!("Expected log entry, got {other:?}"),
    }
    match &entries[1] {
        LogEntry::Analytic { title, note, .. } => {
            assert_eq!(title, ANALYTIC_TITLE);
            assert!(note.contains("2 matching group(s)"));
        }
        other => panic!("Expected analytic entry, got {other:?}"),
    }
    let titles: Vec<&str> = log.statistics().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Keep Frequency", "DupSeq Frequency"]);
}

#[test]
fn test_identify_unknown_sorting_variable_fails_fast() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let mut request = IdentifyRequest::new(names(&["Name"]));
    request.sorting = names(&["Cty"]);

    let err = identify_duplicates(&mut store, &mut log, &request, None).unwrap_err();
    match err {
        IdentifyError::UnknownVariable { name, suggestion } => {
            assert_eq!(name, "Cty");
            assert_eq!(suggestion.as_deref(), Some("City"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.dataset(), &people());
    assert!(log.is_empty());
}

#[test]
fn test_identify_twice_collides_on_indicator_name() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let request = IdentifyRequest::new(names(&["Name"]));

    identify_duplicates(&mut store, &mut log, &request, None).unwrap();
    let snapshot = store.dataset().clone();
    let entries = log.len();

    let err = identify_duplicates(&mut store, &mut log, &request, None).unwrap_err();
    assert!(matches!(
        err,
        IdentifyError::Store(StoreError::DuplicateVariable(ref name)) if name == "PrimaryLast"
    ));
    assert_eq!(store.dataset(), &snapshot);
    assert_eq!(log.len(), entries);
}

#[test]
fn test_identify_no_duplicates() {
    let mut store = MemoryStore::new(people());
    let mut log = MemoryLog::new();
    let outcome =
        identify_duplicates(&mut store, &mut log, &IdentifyRequest::new(names(&["ID"])), None)
            .unwrap();

    assert!(matches!(outcome, IdentifyOutcome::Applied(_)));
    assert!(!outcome.has_duplicates());
    assert_eq!(column(&store, "PrimaryLast"), vec!["1"; 10]);
    assert_eq!(store.dataset().cell(0, 0), Some(&Cell::from(101.0)));
}
