use rust_dicebot::testcase::{parse_file, TestCaseError};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_fixture_files() {
    let mut paths: Vec<_> = std::fs::read_dir(fixtures_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "txt"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty());

    let mut failures: Vec<TestCaseError> = Vec::new();
    let mut count = 0;
    for path in &paths {
        for case in parse_file(path).unwrap() {
            count += 1;
            if let Err(err) = case.run() {
                failures.push(err);
            }
        }
    }

    let report: Vec<_> = failures.iter().map(ToString::to_string).collect();
    assert!(
        report.is_empty(),
        "{} of {} cases failed:\n{}",
        report.len(),
        count,
        report.join("\n\n")
    );
}

#[test]
fn test_game_id_from_file_stem() {
    let cases = parse_file(fixtures_dir().join("BattleTech.txt")).unwrap();
    assert!(cases.iter().all(|case| case.game_id == "BattleTech"));
    assert_eq!(cases[0].index, 1);
    assert_eq!(cases[0].input, vec!["CT"]);
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        parse_file(fixtures_dir().join("NoSuchGame.txt")),
        Err(TestCaseError::Io(_))
    ));
}
