pub mod injection;
pub mod permissions;
pub mod secrets;
pub mod triggers;
pub mod unpinned;

use crate::parser::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use tracing::warn;

/// Severity level of a finding, ordered lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity level: {other}")),
        }
    }
}

/// A single security finding produced by a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Stable rule identifier, e.g. "unpinned-action".
    pub rule_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Workflow file the finding points at.
    pub file_path: String,
    /// Offending job id; empty for workflow-level findings.
    pub job_id: String,
    /// Offending step name; empty for job- or workflow-level findings.
    pub step_name: String,
    /// 1-based source line, when the parser could locate the node.
    pub line: Option<usize>,
}

/// A rule takes a normalized workflow and returns zero or more findings.
/// Rules never see raw YAML, other rules' output, the clock, or the network.
pub type RuleFn = fn(&Workflow) -> Vec<Finding>;

/// One registered rule.
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub summary: &'static str,
    pub check: RuleFn,
}

/// The full rule registry, assembled statically so registration order is
/// explicit. Append-only: there is no way to unregister or reorder, and
/// findings must not depend on which other rules are present.
pub const RULES: &[Rule] = &[
    Rule {
        id: "unpinned-action",
        severity: Severity::High,
        summary: "Action referenced by mutable tag or branch instead of a commit SHA",
        check: unpinned::check,
    },
    Rule {
        id: "write-all-permissions",
        severity: Severity::Critical,
        summary: "Workflow or job grants write access to all scopes",
        check: permissions::check_write_all,
    },
    Rule {
        id: "missing-permissions",
        severity: Severity::Medium,
        summary: "No explicit permissions block, token keeps broad defaults",
        check: permissions::check_missing,
    },
    Rule {
        id: "script-injection",
        severity: Severity::Critical,
        summary: "User-controlled expression interpolated into a run block",
        check: injection::check,
    },
    Rule {
        id: "dangerous-trigger",
        severity: Severity::High,
        summary: "pull_request_target runs untrusted PRs with write access",
        check: triggers::check_dangerous,
    },
    Rule {
        id: "manual-trigger",
        severity: Severity::Low,
        summary: "Workflow can be triggered manually via workflow_dispatch",
        check: triggers::check_manual,
    },
    Rule {
        id: "secret-in-run",
        severity: Severity::High,
        summary: "Secret interpolated directly into a run block",
        check: secrets::check,
    },
];

/// Run every registered rule against a workflow and concatenate the
/// findings in registration order.
///
/// A panicking rule is logged and skipped; it contributes nothing but never
/// aborts the remaining rules, so malformed input tripping one rule cannot
/// blank out a whole scan. Output is deterministic for a fixed workflow.
pub fn run_all(workflow: &Workflow, file_path: &str) -> Vec<Finding> {
    run_rules(RULES, workflow, file_path)
}

fn run_rules(rules: &[Rule], workflow: &Workflow, file_path: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules {
        match catch_unwind(AssertUnwindSafe(|| (rule.check)(workflow))) {
            Ok(rule_findings) => findings.extend(rule_findings),
            Err(_) => {
                warn!(rule = rule.id, "rule panicked, skipping its findings");
            }
        }
    }
    for finding in &mut findings {
        if finding.file_path.is_empty() {
            finding.file_path = file_path.to_string();
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::WorkflowParser;

    fn scan(yaml: &str) -> Vec<Finding> {
        let wf = WorkflowParser::parse(yaml, "ci.yml".to_string()).unwrap();
        run_all(&wf, "ci.yml")
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_severity_round_trip() {
        for sev in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(sev.to_string().parse::<Severity>().unwrap(), sev);
        }
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn test_rule_ids_unique() {
        for (i, a) in RULES.iter().enumerate() {
            for b in &RULES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_run_all_attaches_file_path() {
        let findings = scan("on: [pull_request_target]\njobs: {}\n");
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.file_path == "ci.yml"));
    }

    #[test]
    fn test_run_all_is_deterministic() {
        let yaml = r#"
on: [pull_request_target, workflow_dispatch]
permissions: write-all
jobs:
  build:
    steps:
      - uses: actions/checkout@v3
      - run: echo "${{ secrets.TOKEN }}"
"#;
        let wf = WorkflowParser::parse(yaml, "ci.yml".to_string()).unwrap();
        let first = run_all(&wf, "ci.yml");
        let second = run_all(&wf, "ci.yml");
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_findings_concatenated_in_registration_order() {
        let yaml = r#"
on: [pull_request_target]
permissions: write-all
jobs:
  build:
    steps:
      - uses: actions/checkout@v3
"#;
        let findings = scan(yaml);
        let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["unpinned-action", "write-all-permissions", "dangerous-trigger"]
        );
    }

    #[test]
    fn test_hardened_workflow_yields_no_findings() {
        let yaml = r#"
name: Release
on: push
permissions:
  contents: read
jobs:
  build:
    runs-on: ubuntu-latest
    permissions:
      contents: read
    steps:
      - uses: actions/checkout@a5ac7e51b41094c92402da3b24376905380afc29
      - name: Build
        env:
          TITLE: ${{ github.event.pull_request.title }}
        run: echo "$TITLE" && make build
"#;
        assert!(scan(yaml).is_empty());
    }

    #[test]
    fn test_panicking_rule_does_not_abort_scan() {
        fn panicky(_wf: &Workflow) -> Vec<Finding> {
            panic!("boom");
        }
        let registry = [
            Rule {
                id: "exploder",
                severity: Severity::Low,
                summary: "always panics",
                check: panicky,
            },
            Rule {
                id: "manual-trigger",
                severity: Severity::Low,
                summary: "Workflow can be triggered manually via workflow_dispatch",
                check: triggers::check_manual,
            },
        ];
        let wf = WorkflowParser::parse(
            "on: [workflow_dispatch]\njobs: {}\n",
            "ci.yml".to_string(),
        )
        .unwrap();

        let findings = run_rules(&registry, &wf, "ci.yml");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "manual-trigger");
        assert_eq!(findings[0].file_path, "ci.yml");
    }
}
