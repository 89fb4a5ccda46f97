use actionguard_core::config::Config;
use actionguard_core::parser::{ParseError, Permissions, WorkflowParser};
use actionguard_core::report;
use actionguard_core::rules::{run_all, Severity, RULES};
use std::path::{Path, PathBuf};

/// Workspace root is two levels up from CARGO_MANIFEST_DIR of actionguard-core.
fn fixture(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent()
        .unwrap() // crates/
        .parent()
        .unwrap() // workspace root
        .join("tests/fixtures/workflows")
        .join(name)
}

#[test]
fn test_vulnerable_fixture_end_to_end() {
    let path = fixture("vulnerable.yml");
    let wf = WorkflowParser::parse_file(&path).unwrap();

    assert_eq!(wf.triggers, vec!["pull_request_target", "workflow_dispatch"]);
    assert_eq!(wf.permissions, Permissions::Blanket("write-all".into()));

    let findings = run_all(&wf, &path.to_string_lossy());
    let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "unpinned-action",
            "write-all-permissions",
            "script-injection",
            "dangerous-trigger",
            "manual-trigger",
            "secret-in-run",
        ]
    );

    // Step-level findings point at the offending step, workflow-level
    // findings carry no job/step.
    let injection = findings.iter().find(|f| f.rule_id == "script-injection").unwrap();
    assert_eq!(injection.job_id, "triage");
    assert_eq!(injection.step_name, "Greet author");
    assert!(injection.line.is_some());

    let trigger = findings.iter().find(|f| f.rule_id == "dangerous-trigger").unwrap();
    assert_eq!(trigger.job_id, "");
    assert_eq!(trigger.step_name, "");
}

#[test]
fn test_hardened_fixture_produces_no_findings() {
    let path = fixture("hardened.yml");
    let wf = WorkflowParser::parse_file(&path).unwrap();
    let findings = run_all(&wf, &path.to_string_lossy());
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn test_write_all_only_workflow_single_critical_finding() {
    let wf = WorkflowParser::parse(
        "on: push\npermissions: write-all\njobs: {}\n",
        "ci.yml".to_string(),
    )
    .unwrap();
    let findings = run_all(&wf, "ci.yml");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "write-all-permissions");
    assert_eq!(findings[0].severity, Severity::Critical);
}

#[test]
fn test_malformed_document_never_reaches_rules() {
    let result = WorkflowParser::parse("on: [push\n", "bad.yml".to_string());
    assert!(matches!(result, Err(ParseError::Yaml(_))));
}

#[test]
fn test_repeated_scans_are_byte_identical() {
    let path = fixture("vulnerable.yml");
    let wf = WorkflowParser::parse_file(&path).unwrap();
    let a = report::to_json(&run_all(&wf, "ci.yml"));
    let b = report::to_json(&run_all(&wf, "ci.yml"));
    assert_eq!(a, b);
}

#[test]
fn test_rule_independence() {
    // Each rule sees only the workflow; running one alone must produce the
    // same findings it contributes to the full run.
    let path = fixture("vulnerable.yml");
    let wf = WorkflowParser::parse_file(&path).unwrap();
    let full = run_all(&wf, &wf.file_path.clone());

    for rule in RULES {
        let alone = (rule.check)(&wf);
        let contributed: Vec<_> = full.iter().filter(|f| f.rule_id == rule.id).collect();
        assert_eq!(alone.len(), contributed.len(), "rule {}", rule.id);
        for (a, b) in alone.iter().zip(&contributed) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.description, b.description);
        }
    }
}

#[test]
fn test_config_filter_applies_after_engine() {
    let path = fixture("vulnerable.yml");
    let wf = WorkflowParser::parse_file(&path).unwrap();
    let findings = run_all(&wf, "ci.yml");

    let config = Config {
        severity: Severity::Critical,
        ..Config::default()
    };
    let kept = config.filter(findings.clone());
    assert!(kept.len() < findings.len());
    assert!(kept.iter().all(|f| f.severity == Severity::Critical));
}
