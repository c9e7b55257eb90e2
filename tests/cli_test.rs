use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_vibefilter"))
        .args(args)
        .output()
        .unwrap()
}

const PEOPLE: &str =
    r#"[{"age": 25, "city": "NYC"}, {"age": 31, "city": "LA"}, {"age": 17, "city": "SF"}]"#;

#[test]
fn test_cli_prints_page() {
    let data = json_file(PEOPLE);
    let output = run(&[
        "--data",
        data.path().to_str().unwrap(),
        "--query",
        "#{age} >= {18}",
        "--limit",
        "1",
    ]);
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["total_count"], 2);
    assert_eq!(result["has_more"], true);
    assert_eq!(result["page"][0]["city"], "NYC");
}

#[test]
fn test_cli_count_with_lists() {
    let data = json_file(PEOPLE);
    let lists = json_file(r#"{"west": ["LA", "SF"]}"#);
    let output = run(&[
        "--data",
        data.path().to_str().unwrap(),
        "--lists",
        lists.path().to_str().unwrap(),
        "--query",
        "#{city} inUserList {west}",
        "--count",
    ]);
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["total_count"], 2);
}

#[test]
fn test_cli_reports_syntax_error() {
    let data = json_file(PEOPLE);
    let output = run(&[
        "--data",
        data.path().to_str().unwrap(),
        "--query",
        "#{age} >=",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Filter failed"));
}
