use pipeforge_registry::{Severity, ValidityReport};
use pretty_assertions::assert_eq;

#[test]
fn empty_report_is_valid() {
    let report = ValidityReport::new();
    assert!(report.is_valid());
    assert!(report.is_empty());
}

#[test]
fn nested_contexts_build_paths() {
    let mut report = ValidityReport::new();
    {
        let mut nodes = report.resolve("Nodes");
        nodes.resolve("imaging:blur").error("input slot refers to unknown data type");
        nodes.resolve("imaging:crop").warning("deprecated");
    }
    report.resolve("Extensions").info("2 extensions loaded");

    assert_eq!(report.len(), 3);
    assert!(!report.is_valid());
    let error = report.errors().next().unwrap();
    assert_eq!(error.context, vec!["Nodes", "imaging:blur"]);
    assert_eq!(error.severity, Severity::Error);
    assert_eq!(report.under(&["Nodes"]).count(), 2);
    assert_eq!(report.under(&["Nodes", "imaging:crop"]).count(), 1);
}

#[test]
fn entry_display_includes_context() {
    let mut report = ValidityReport::new();
    report.resolve("Nodes").resolve("ns:a").warning("missing dependency: data type 'ns:b'");
    assert_eq!(
        report.entries()[0].to_string(),
        "[warning] Nodes / ns:a: missing dependency: data type 'ns:b'"
    );
}

#[test]
fn report_serializes_to_json() {
    let mut report = ValidityReport::new();
    report.resolve("Nodes").error("broken");
    let json = report.to_json().unwrap();
    assert!(json.contains("\"severity\": \"error\""));
    assert!(!json.contains("details"));

    let back: ValidityReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
