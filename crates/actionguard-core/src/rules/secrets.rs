//! Rule: secrets interpolated directly into run blocks.
//!
//! A `${{ secrets.X }}` expanded inside a shell command can leak through
//! process listings, `set -x` tracing, or error output. Passing the secret
//! via `env:` keeps it out of the command text.

use crate::parser::Workflow;
use crate::rules::{Finding, Severity};
use regex::Regex;

pub fn check(workflow: &Workflow) -> Vec<Finding> {
    let secret_ref = Regex::new(r"\$\{\{\s*secrets\.\w+\s*\}\}").unwrap();

    let mut findings = Vec::new();
    for job in &workflow.jobs {
        for step in &job.steps {
            let Some(run) = &step.run else { continue };
            let refs: Vec<&str> = secret_ref.find_iter(run).map(|m| m.as_str()).collect();
            if refs.is_empty() {
                continue;
            }
            findings.push(Finding {
                rule_id: "secret-in-run".to_string(),
                severity: Severity::High,
                title: "Secret used directly in 'run:' block".to_string(),
                description: format!(
                    "The step uses {} directly in a shell command. This risks \
                     exposing the secret in logs or to external processes. Pass \
                     secrets via environment variables instead:\n\
                     \x20 env:\n\
                     \x20   MY_SECRET: ${{{{ secrets.MY_SECRET }}}}\n\
                     \x20 run: echo \"$MY_SECRET\"",
                    refs.join(", ")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::WorkflowParser;

    fn scan(yaml: &str) -> Vec<Finding> {
        let wf = WorkflowParser::parse(yaml, "ci.yml".to_string()).unwrap();
        check(&wf)
    }

    #[test]
    fn test_secret_in_run_flagged() {
        let findings = scan(
            r#"
on: push
jobs:
  deploy:
    steps:
      - name: Push image
        run: docker login -u ci -p ${{ secrets.REGISTRY_TOKEN }}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].description.contains("secrets.REGISTRY_TOKEN"));
    }

    #[test]
    fn test_one_finding_per_step_listing_all_refs() {
        let findings = scan(
            r#"
on: push
jobs:
  deploy:
    steps:
      - run: |
          curl -H "Authorization: ${{ secrets.API_KEY }}" https://example.com
          echo ${{ secrets.OTHER }}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("secrets.API_KEY"));
        assert!(findings[0].description.contains("secrets.OTHER"));
    }

    #[test]
    fn test_secret_in_env_not_flagged() {
        let findings = scan(
            r#"
on: push
jobs:
  deploy:
    steps:
      - env:
          TOKEN: ${{ secrets.REGISTRY_TOKEN }}
        run: docker login -u ci -p "$TOKEN"
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_non_secret_expression_not_flagged() {
        let findings = scan(
            r#"
on: push
jobs:
  build:
    steps:
      - run: echo ${{ github.sha }}
"#,
        );
        assert!(findings.is_empty());
    }
}
