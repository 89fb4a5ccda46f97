//! Rule: actions referenced by tag or branch instead of a commit SHA.
//!
//! A tag like `@v3` or a branch like `@main` can be moved by the action
//! owner, silently swapping the code a workflow runs. Pinning to a full
//! SHA guarantees the exact reviewed commit.

use crate::parser::Workflow;
use crate::rules::{Finding, Severity};

pub fn check(workflow: &Workflow) -> Vec<Finding> {
    let mut findings = Vec::new();
    for job in &workflow.jobs {
        for step in &job.steps {
            let Some(uses) = &step.uses else { continue };
            if uses.is_pinned {
                continue;
            }
            findings.push(Finding {
                rule_id: "unpinned-action".to_string(),
                severity: Severity::High,
                title: "Unpinned action reference".to_string(),
                description: format!(
                    "Action '{}' is referenced by tag/branch '{}', not by a commit \
                     SHA. A compromised or force-pushed tag could inject malicious \
                     code into your workflow.",
                    uses.full_ref, uses.git_ref
                ),
                file_path: workflow.file_path.clone(),
                job_id: job.id.clone(),
                step_name: step.display_name(),
                line: Some(step.line),
            });
        }
    }
    findings
}
