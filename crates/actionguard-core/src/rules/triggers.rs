//! Rules: risky workflow triggers.
//!
//! `pull_request_target` runs in the context of the base branch with write
//! permissions and secrets access; combined with a checkout of the PR head
//! it lets untrusted code run with elevated privileges. `workflow_dispatch`
//! is only worth a note.

use crate::parser::Workflow;
use crate::rules::{Finding, Severity};

pub fn check_dangerous(workflow: &Workflow) -> Vec<Finding> {
    if !workflow.triggers.iter().any(|t| t == "pull_request_target") {
        return Vec::new();
    }

    vec![Finding {
        rule_id: "dangerous-trigger".to_string(),
        severity: Severity::High,
        title: "Workflow uses 'pull_request_target' trigger".to_string(),
        description: "The 'pull_request_target' trigger runs with write access to \
                      the base repository and has access to secrets. If this \
                      workflow checks out the PR head branch and runs any code from \
                      it, an attacker can submit a malicious PR that executes \
                      arbitrary code with elevated privileges. Consider using \
                      'pull_request' instead, or ensure you never check out or \
                      execute untrusted PR code."
            .to_string(),
        file_path: workflow.file_path.clone(),
        job_id: String::new(),
        step_name: String::new(),
        line: None,
    }]
}

pub fn check_manual(workflow: &Workflow) -> Vec<Finding> {
    if !workflow.triggers.iter().any(|t| t == "workflow_dispatch") {
        return Vec::new();
    }

    vec![Finding {
        rule_id: "manual-trigger".to_string(),
        severity: Severity::Low,
        title: "Workflow can be triggered manually".to_string(),
        description: "This workflow uses 'workflow_dispatch', allowing manual \
                      triggering. Ensure that only authorized users can trigger it \
                      and that inputs are validated."
            .to_string(),
        file_path: workflow.file_path.clone(),
        job_id: String::new(),
        step_name: String::new(),
        line: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::WorkflowParser;

    fn parse(yaml: &str) -> Workflow {
        WorkflowParser::parse(yaml, "ci.yml".to_string()).unwrap()
    }

    #[test]
    fn test_pull_request_target_flagged_once() {
        let wf = parse("on: [push, pull_request_target]\njobs: {}\n");
        let findings = check_dangerous(&wf);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].job_id, "");
    }

    #[test]
    fn test_mapping_encoding_also_detected() {
        let wf = parse("on:\n  pull_request_target:\n    branches: [main]\njobs: {}\n");
        assert_eq!(check_dangerous(&wf).len(), 1);
    }

    #[test]
    fn test_plain_pull_request_not_flagged() {
        let wf = parse("on: [pull_request]\njobs: {}\n");
        assert!(check_dangerous(&wf).is_empty());
    }

    #[test]
    fn test_workflow_dispatch_noted() {
        let wf = parse("on: [workflow_dispatch]\njobs: {}\n");
        let findings = check_manual(&wf);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn test_no_triggers_no_findings() {
        let wf = parse("jobs: {}\n");
        assert!(check_dangerous(&wf).is_empty());
        assert!(check_manual(&wf).is_empty());
    }
}
