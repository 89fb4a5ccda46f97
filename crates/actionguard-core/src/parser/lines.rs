//! Best-effort source line lookup for jobs and steps.
//!
//! serde_yaml does not expose node positions, so line numbers come from a
//! single indentation-aware scan of the raw text. Anything the scan cannot
//! locate falls back to line 1.

/// 1-based start lines for every job and step in a workflow document.
#[derive(Debug, Default)]
pub struct LineIndex {
    jobs: Vec<JobLines>,
}

#[derive(Debug)]
struct JobLines {
    id: String,
    line: usize,
    step_indent: Option<usize>,
    step_lines: Vec<usize>,
}

impl LineIndex {
    /// Scan the raw workflow text.
    ///
    /// Job entries are the keys one indentation level below a top-level
    /// `jobs:` key; step entries are the `- ` sequence items under a job's
    /// `steps:` key. Other block lists inside a job (`needs:`, matrix
    /// values) are not steps and must not be counted.
    pub fn scan(content: &str) -> LineIndex {
        let mut index = LineIndex::default();
        let mut in_jobs = false;
        let mut job_indent: Option<usize> = None;
        let mut steps_indent: Option<usize> = None;

        for (i, raw_line) in content.lines().enumerate() {
            let line_no = i + 1;
            let trimmed = raw_line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = raw_line.len() - trimmed.len();

            if indent == 0 {
                in_jobs = trimmed == "jobs:" || trimmed.starts_with("jobs:");
                job_indent = None;
                steps_indent = None;
                continue;
            }
            if !in_jobs {
                continue;
            }

            // First indented key under `jobs:` fixes the job indent level.
            let is_key = !trimmed.starts_with('-')
                && trimmed.contains(':')
                && is_plain_key(trimmed);
            if is_key && job_indent.map_or(true, |ji| indent <= ji) {
                if job_indent.is_none() {
                    job_indent = Some(indent);
                }
                if Some(indent) == job_indent {
                    let id = trimmed.split(':').next().unwrap_or("").to_string();
                    index.jobs.push(JobLines {
                        id,
                        line: line_no,
                        step_indent: None,
                        step_lines: Vec::new(),
                    });
                    steps_indent = None;
                    continue;
                }
            }

            if is_key {
                // A sibling key at or above the `steps:` level closes the
                // step list; keys deeper than it belong to a step mapping.
                if steps_indent.map_or(false, |si| indent <= si) {
                    steps_indent = None;
                }
                if steps_indent.is_none()
                    && trimmed.split(':').next() == Some("steps")
                {
                    steps_indent = Some(indent);
                }
                continue;
            }

            // Sequence items once `steps:` has been seen are the job's
            // steps; the first item fixes their indent, deeper items belong
            // to nested lists inside a step.
            if steps_indent.is_some() && (trimmed.starts_with("- ") || trimmed == "-") {
                if let Some(job) = index.jobs.last_mut() {
                    let si = *job.step_indent.get_or_insert(indent);
                    if indent == si {
                        job.step_lines.push(line_no);
                    }
                }
            }
        }

        index
    }

    /// Line of the job with the given id, defaulting to 1.
    pub fn job_line(&self, job_id: &str) -> usize {
        self.jobs
            .iter()
            .find(|j| j.id == job_id)
            .map(|j| j.line)
            .unwrap_or(1)
    }

    /// Line of the `idx`-th step (0-based) of a job, defaulting to 1.
    pub fn step_line(&self, job_id: &str, idx: usize) -> usize {
        self.jobs
            .iter()
            .find(|j| j.id == job_id)
            .and_then(|j| j.step_lines.get(idx).copied())
            .unwrap_or(1)
    }
}

/// A job id key looks like `build:` or `build-and-test:`, never a quoted
/// scalar or a flow collection.
fn is_plain_key(trimmed: &str) -> bool {
    let key = trimmed.split(':').next().unwrap_or("");
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
