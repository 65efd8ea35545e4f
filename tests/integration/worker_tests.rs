use super::fixtures::{people, PEOPLE_CSV};
use dupecases::dataset::ColumnSpec;
use dupecases::duplicates::PrimarySelection;
use dupecases::progress::ProgressCallback;
use dupecases::worker::{serve, spawn, spawn_with_progress, WorkerRequest, WorkerResponse};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    phases: Mutex<Vec<String>>,
}

impl ProgressCallback for Recorder {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        self.phases.lock().unwrap().push(format!("start:{phase}"));
    }

    fn on_phase_end(&self, phase: &str) {
        self.phases.lock().unwrap().push(format!("end:{phase}"));
    }
}

#[test]
fn test_spawn_matches_inline_execution() {
    let mut request = WorkerRequest::new(people(), vec![ColumnSpec::new(1), ColumnSpec::new(2)]);
    request.primary_selection = PrimarySelection::First;
    request.sequence_count_enabled = true;

    let inline = request.execute(None);
    let threaded = spawn(request).unwrap().wait().unwrap();
    assert_eq!(inline, threaded);
    assert_eq!(threaded.statistics.len(), 2);
}

#[test]
fn test_spawn_reports_engine_phases() {
    let recorder = Arc::new(Recorder::default());
    let mut request = WorkerRequest::new(people(), vec![ColumnSpec::new(1)]);
    request.sorting_columns = vec![ColumnSpec::new(0)];

    let callback: Arc<dyn ProgressCallback> = recorder.clone();
    spawn_with_progress(request, Some(callback))
        .unwrap()
        .wait()
        .unwrap();

    let phases = recorder.phases.lock().unwrap().clone();
    assert_eq!(
        phases,
        vec!["start:keying", "end:keying", "start:sorting", "end:sorting"]
    );
}

#[test]
fn test_serve_round_trip_json() {
    let data: Vec<Vec<serde_json::Value>> = PEOPLE_CSV
        .lines()
        .map(|line| line.split(',').map(|f| serde_json::json!(f)).collect())
        .collect();
    let request = serde_json::json!({
        "data": data,
        "matchingColumns": [{"columnIndex": 1, "name": "Name"}],
        "sortingColumns": [],
        "sortDirection": "ascending",
        "primarySelection": "last",
        "primaryIndicatorName": "PrimaryLast",
        "sequenceCountEnabled": true,
        "sequenceIndicatorName": "MatchSequence",
        "moveMatchingToTop": true,
        "displayFrequencies": true
    });

    let mut out = Vec::new();
    serve(request.to_string().as_bytes(), &mut out).unwrap();
    let response: WorkerResponse = serde_json::from_slice(&out).unwrap();

    assert!(response.success);
    let output = response.into_output().unwrap();
    assert_eq!(output.result.primary_values, vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(output.result.reordered.body_len(), 10);
    assert_eq!(output.statistics.len(), 2);
}

#[test]
fn test_serve_rejects_wrong_shape() {
    let mut out = Vec::new();
    let response = serve(r#"{"data": "nope"}"#.as_bytes(), &mut out).unwrap();
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Malformed request"));
}
