use crate::parser::lines::LineIndex;
use crate::parser::model::*;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// The document could not be parsed as a workflow at all. A document that
/// parses but has no jobs or triggers is not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read workflow file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("workflow file is not a YAML mapping")]
    NotAMapping,
}

/// Parser for GitHub Actions workflow YAML files.
pub struct WorkflowParser;

impl WorkflowParser {
    /// Parse a workflow file from disk.
    pub fn parse_file(path: &Path) -> Result<Workflow, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path.to_string_lossy().to_string())
    }

    /// Parse workflow YAML content into a normalized `Workflow`.
    pub fn parse(content: &str, source_file: String) -> Result<Workflow, ParseError> {
        let yaml: Value = serde_yaml::from_str(content)?;
        let root = yaml.as_mapping().ok_or(ParseError::NotAMapping)?;
        let lines = LineIndex::scan(content);

        let name = lookup(root, "name")
            .and_then(|v| v.as_str())
            .map(String::from);

        let triggers = parse_triggers(root);
        let permissions = parse_permissions(lookup(root, "permissions"));
        let env = lookup(root, "env").map(parse_env).unwrap_or_default();

        let mut jobs = Vec::new();
        if let Some(jobs_map) = lookup(root, "jobs").and_then(|v| v.as_mapping()) {
            for (job_id, job_config) in jobs_map {
                let Some(job_id) = job_id.as_str() else {
                    continue;
                };
                jobs.push(parse_job(job_id, job_config, &lines));
            }
        }

        let workflow = Workflow {
            file_path: source_file,
            name,
            triggers,
            permissions,
            env,
            jobs,
        };
        debug!(
            file = %workflow.file_path,
            jobs = workflow.jobs.len(),
            steps = workflow.step_count(),
            triggers = ?workflow.triggers,
            "parsed workflow"
        );
        Ok(workflow)
    }
}

/// Look up a key in a YAML mapping by name.
///
/// YAML 1.1 resolves an unquoted `on` key to boolean true, so the `on`
/// lookup also matches a `true` key depending on how the parser resolved it.
fn lookup<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    for (k, v) in map {
        match k {
            Value::String(s) if s == key => return Some(v),
            Value::Bool(true) if key == "on" => return Some(v),
            _ => {}
        }
    }
    None
}

/// Normalize the `on:` field into an ordered list of trigger names.
///
/// The field may be a bare string, a sequence of strings, or a mapping
/// whose keys are trigger names (values carry trigger config we don't
/// need). Declaration order is preserved; absence yields an empty list.
fn parse_triggers(root: &Mapping) -> Vec<String> {
    let on = match lookup(root, "on") {
        Some(v) => v,
        None => return Vec::new(),
    };

    match on {
        Value::String(event) => vec![event.clone()],
        Value::Sequence(events) => events
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .filter_map(|(k, _)| k.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize a `permissions:` field.
///
/// A bare string is a blanket grant; a mapping is a set of per-scope
/// grants in declaration order. A missing field is `Absent`, which is not
/// the same as an explicit empty mapping.
fn parse_permissions(field: Option<&Value>) -> Permissions {
    match field {
        None => Permissions::Absent,
        Some(Value::String(level)) => Permissions::Blanket(level.clone()),
        Some(Value::Mapping(map)) => Permissions::Scoped(
            map.iter()
                .filter_map(|(k, v)| {
                    let scope = k.as_str()?;
                    let level = v.as_str()?;
                    Some((scope.to_string(), level.to_string()))
                })
                .collect(),
        ),
        Some(_) => Permissions::Absent,
    }
}

fn parse_job(job_id: &str, config: &Value, lines: &LineIndex) -> Job {
    let name = config
        .get("name")
        .and_then(|v| v.as_str())
        .map(String::from);

    let runs_on = config
        .get("runs-on")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let permissions = parse_permissions(config.get("permissions"));
    let env = config.get("env").map(parse_env).unwrap_or_default();

    let mut steps = Vec::new();
    if let Some(seq) = config.get("steps").and_then(|v| v.as_sequence()) {
        for (idx, step) in seq.iter().enumerate() {
            steps.push(parse_step(step, lines.step_line(job_id, idx)));
        }
    }

    Job {
        id: job_id.to_string(),
        name,
        runs_on,
        permissions,
        steps,
        env,
        line: lines.job_line(job_id),
    }
}

fn parse_step(step: &Value, line: usize) -> Step {
    let name = step.get("name").and_then(|v| v.as_str()).map(String::from);
    let uses = step
        .get("uses")
        .and_then(|v| v.as_str())
        .and_then(ActionRef::parse);
    let run = step.get("run").and_then(|v| v.as_str()).map(String::from);
    let env = step.get("env").map(parse_env).unwrap_or_default();

    Step {
        name,
        uses,
        run,
        env,
        line,
    }
}

fn parse_env(env: &Value) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(mapping) = env.as_mapping() {
        for (k, v) in mapping {
            if let (Some(key), Some(val)) = (k.as_str(), v.as_str()) {
                map.insert(key.to_string(), val.to_string());
            }
        }
    }
    map
}
