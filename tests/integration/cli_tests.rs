use super::fixtures::write_people;
use clap::Parser;
use dupecases::cli::{Cli, Commands, OutputFormat};
use dupecases::dataset::read_csv;
use dupecases::error::ExitCode;
use dupecases::run_app;
use tempfile::TempDir;

fn run(argv: &[&str]) -> anyhow::Result<ExitCode> {
    let mut full = vec!["dupecases", "--quiet", "--no-color"];
    full.extend_from_slice(argv);
    run_app(Cli::try_parse_from(full)?)
}

#[test]
fn test_identify_with_duplicates_exits_success() {
    let dir = TempDir::new().unwrap();
    let input = write_people(dir.path());
    let code = run(&["identify", input.to_str().unwrap(), "-m", "Name"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_identify_without_duplicates_exits_no_duplicates() {
    let dir = TempDir::new().unwrap();
    let input = write_people(dir.path());
    let code = run(&["identify", input.to_str().unwrap(), "-m", "ID"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
    assert_eq!(code.as_i32(), 2);
}

#[test]
fn test_identify_unknown_variable_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let input = write_people(dir.path());
    let err = run(&["identify", input.to_str().unwrap(), "-m", "Nmae"]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
    assert!(format!("{err:#}").contains("Name"));
}

#[test]
fn test_identify_missing_file_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.csv");
    let err = run(&["identify", missing.to_str().unwrap(), "-m", "Name"]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
}

#[test]
fn test_identify_write_adds_indicator_columns() {
    let dir = TempDir::new().unwrap();
    let input = write_people(dir.path());
    let output = dir.path().join("out.csv");
    run(&[
        "identify",
        input.to_str().unwrap(),
        "-m",
        "Name",
        "-m",
        "Age",
        "--sequence",
        "--keep-order",
        "--write",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let written = read_csv(&output, ',').unwrap();
    assert_eq!(
        written.column_names(),
        vec!["ID", "Name", "Age", "City", "PrimaryLast", "MatchSequence"]
    );
    let primary = written.column_index("PrimaryLast").unwrap();
    let values: Vec<String> = (0..written.body_len())
        .map(|row| written.cell(row, primary).unwrap().key_string())
        .collect();
    assert_eq!(values, vec!["0", "0", "0", "1", "1", "1", "1", "1", "1", "1"]);
}

#[test]
fn test_variables_command() {
    let dir = TempDir::new().unwrap();
    let input = write_people(dir.path());
    for format in ["text", "json", "csv"] {
        let code = run(&["variables", input.to_str().unwrap(), "-o", format]).unwrap();
        assert_eq!(code, ExitCode::Success);
    }
}

#[test]
fn test_parse_identify_flags() {
    let cli = Cli::try_parse_from([
        "dupecases", "-vv", "identify", "data.csv", "-m", "Name", "-s", "ID", "--direction",
        "descending", "--no-frequencies", "-o", "json",
    ])
    .unwrap();
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Identify(args) => {
            assert_eq!(args.matching, vec!["Name"]);
            assert_eq!(args.sorting, vec!["ID"]);
            assert_eq!(args.display_frequencies(), Some(false));
            assert_eq!(args.move_matching_to_top(), None);
            assert_eq!(args.output, OutputFormat::Json);
        }
        _ => panic!("Expected Identify command"),
    }
}

#[test]
fn test_parse_rejects_conflicting_flags() {
    assert!(Cli::try_parse_from([
        "dupecases", "identify", "data.csv", "-m", "Name", "--move-to-top", "--keep-order",
    ])
    .is_err());
    assert!(Cli::try_parse_from(["dupecases", "identify", "data.csv"]).is_err());
}
