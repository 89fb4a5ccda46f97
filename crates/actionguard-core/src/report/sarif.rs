//! SARIF 2.1.0 output for GitHub Code Scanning.
//!
//! Upload the result in a workflow via
//! `github/codeql-action/upload-sarif` and findings appear as annotations
//! on the PR diff in the Security tab.

use crate::rules::{Finding, Severity};
use serde_json::{json, Value};

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_URI: &str = "https://github.com/actionguard/actionguard";

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// CVSS-like security-severity score GitHub uses for grouping.
fn security_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "9.0",
        Severity::High => "7.0",
        Severity::Medium => "5.0",
        Severity::Low => "3.0",
    }
}

/// Generate a SARIF 2.1.0 document from a finding list.
pub fn to_sarif(findings: &[Finding]) -> Value {
    json!({
        "$schema": SARIF_SCHEMA,
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "actionguard",
                    "version": env!("CARGO_PKG_VERSION"),
                    "informationUri": TOOL_URI,
                    "rules": build_rules(findings),
                }
            },
            "results": findings.iter().map(build_result).collect::<Vec<_>>(),
        }]
    })
}

/// One rules-array entry per unique rule id, in first-seen order.
fn build_rules(findings: &[Finding]) -> Vec<Value> {
    let mut seen: Vec<&str> = Vec::new();
    let mut rules = Vec::new();
    for f in findings {
        if seen.contains(&f.rule_id.as_str()) {
            continue;
        }
        seen.push(&f.rule_id);
        rules.push(json!({
            "id": f.rule_id,
            "name": pascal_case(&f.rule_id),
            "shortDescription": { "text": f.title },
            "fullDescription": { "text": f.title },
            "helpUri": format!("{TOOL_URI}#rule-{}", f.rule_id),
            "properties": {
                "security-severity": security_severity(f.severity),
                "tags": ["security", "github-actions"],
            },
        }));
    }
    rules
}

fn build_result(f: &Finding) -> Value {
    let mut logical = Vec::new();
    if !f.job_id.is_empty() {
        logical.push(json!({ "name": f.job_id, "kind": "job" }));
    }
    if !f.step_name.is_empty() {
        logical.push(json!({ "name": f.step_name, "kind": "step" }));
    }

    json!({
        "ruleId": f.rule_id,
        "level": sarif_level(f.severity),
        "message": { "text": f.description },
        "locations": [{
            "physicalLocation": {
                "artifactLocation": {
                    "uri": f.file_path,
                    "uriBaseId": "%SRCROOT%",
                },
                "region": { "startLine": f.line.unwrap_or(1) },
            },
            "logicalLocations": logical,
        }],
    })
}

/// "unpinned-action" -> "UnpinnedAction"
fn pascal_case(rule_id: &str) -> String {
    rule_id
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
