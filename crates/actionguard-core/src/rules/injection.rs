//! Rule: script injection via expression contexts in run blocks.
//!
//! When a user-controlled value like `github.event.issue.title` is
//! interpolated directly into a `run:` block, an attacker can craft a
//! payload that executes as shell code. Routing the value through an
//! environment variable first keeps it out of the shell parser.

use crate::parser::Workflow;
use crate::rules::{Finding, Severity};
use regex::Regex;

/// Expression contexts carrying user-controlled input.
const DANGEROUS_CONTEXTS: &[&str] = &[
    "github.event.issue.title",
    "github.event.issue.body",
    "github.event.pull_request.title",
    "github.event.pull_request.body",
    "github.event.comment.body",
    "github.event.review.body",
    "github.event.discussion.title",
    "github.event.discussion.body",
    "github.event.pages.*.page_name",
    "github.event.head_commit.message",
    "github.event.head_commit.author.name",
    "github.event.head_commit.author.email",
    "github.head_ref",
];

pub fn check(workflow: &Workflow) -> Vec<Finding> {
    // `${{ ... }}` expressions, possibly spanning lines in a multi-line run.
    let expression = Regex::new(r"(?s)\$\{\{.*?\}\}").unwrap();

    let mut findings = Vec::new();
    for job in &workflow.jobs {
        for step in &job.steps {
            let Some(run) = &step.run else { continue };
            for m in expression.find_iter(run) {
                let expr = m.as_str();
                let inner = expr.trim_matches(|c: char| "${} ".contains(c));
                for dangerous in DANGEROUS_CONTEXTS {
                    if inner.contains(dangerous) {
                        findings.push(Finding {
                            rule_id: "script-injection".to_string(),
                            severity: Severity::Critical,
                            title: "Potential script injection".to_string(),
                            description: format!(
                                "The expression '{expr}' in a 'run:' block uses the \
                                 user-controlled context '{dangerous}'. An attacker \
                                 could craft a malicious value that executes arbitrary \
                                 shell commands. Use an environment variable instead:\n\
                                 \x20 env:\n\
                                 \x20   SAFE_VALUE: {expr}\n\
                                 \x20 run: echo \"$SAFE_VALUE\""
                            ),
                            file_path: workflow.file_path.clone(),
                            job_id: job.id.clone(),
                            step_name: step.display_name(),
                            line: Some(step.line),
                        });
                    }
                }
            }
        }
    }
    findings
}
