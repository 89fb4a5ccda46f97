//! Rules: overly broad or missing token permissions.
//!
//! Workflows should follow least privilege. `permissions: write-all` hands
//! every scope to any step that gets compromised; omitting the block
//! entirely leaves the default token with its broad default access.

use crate::parser::Workflow;
use crate::rules::{Finding, Severity};

/// Flag blanket `write-all` grants at workflow or job level.
pub fn check_write_all(workflow: &Workflow) -> Vec<Finding> {
    let mut findings = Vec::new();

    if workflow.permissions.is_blanket_write() {
        findings.push(Finding {
            rule_id: "write-all-permissions".to_string(),
            severity: Severity::Critical,
            title: "Workflow uses 'permissions: write-all'".to_string(),
            description: "This workflow grants write access to ALL scopes (contents, \
                          packages, issues, pull-requests, etc.). If any step is \
                          compromised, the attacker gets full write access to the \
                          repository."
                .to_string(),
            file_path: workflow.file_path.clone(),
            job_id: String::new(),
            step_name: String::new(),
            line: None,
        });
    }

    for job in &workflow.jobs {
        if job.permissions.is_blanket_write() {
            findings.push(Finding {
                rule_id: "write-all-permissions".to_string(),
                severity: Severity::Critical,
                title: format!("Job '{}' uses 'permissions: write-all'", job.id),
                description: format!(
                    "Job '{}' grants write access to ALL scopes. Restrict \
                     permissions to only what this job needs.",
                    job.id
                ),
                file_path: workflow.file_path.clone(),
                job_id: job.id.clone(),
                step_name: String::new(),
                line: Some(job.line),
            });
        }
    }

    findings
}

/// Flag workflows with no permissions block anywhere: neither at the top
/// level nor as an override on any job.
pub fn check_missing(workflow: &Workflow) -> Vec<Finding> {
    let workflow_absent = workflow.permissions.is_absent();
    let no_job_override = workflow.jobs.iter().all(|j| j.permissions.is_absent());
    if !(workflow_absent && no_job_override) {
        return Vec::new();
    }

    vec![Finding {
        rule_id: "missing-permissions".to_string(),
        severity: Severity::Medium,
        title: "No top-level permissions defined".to_string(),
        description: "This workflow does not declare a 'permissions' block. Without \
                      it, the default token may have broad read-write access. \
                      Explicitly set permissions to the minimum required."
            .to_string(),
        file_path: workflow.file_path.clone(),
        job_id: String::new(),
        step_name: String::new(),
        line: None,
    }]
}
