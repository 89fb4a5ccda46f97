use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A reference to an external GitHub Action, decomposed from a step's
/// `uses:` string of the form `owner/repo@ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    /// The full reference as written, e.g. "actions/checkout@v4".
    pub full_ref: String,
    pub owner: String,
    pub repo: String,
    /// The ref token after the last `@`: a tag, branch, or commit SHA.
    pub git_ref: String,
    /// True iff `git_ref` is a full 40-character hex commit SHA.
    pub is_pinned: bool,
}

impl ActionRef {
    /// Decompose a `uses:` string into its components.
    ///
    /// Returns `None` for references that don't follow the `owner/repo@ref`
    /// shape: local actions (`./path`), docker images (`docker://...`), and
    /// references without a version. Those use a different trust model and
    /// are not analyzable here.
    pub fn parse(uses: &str) -> Option<ActionRef> {
        if uses.is_empty() || !uses.contains('/') {
            debug!(uses, "skipping non-action uses reference");
            return None;
        }

        if uses.starts_with("docker://") || uses.starts_with("./") {
            debug!(uses, "skipping local/docker action");
            return None;
        }

        let (action_path, git_ref) = uses.rsplit_once('@')?;
        let (owner, repo) = action_path.split_once('/')?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        let is_pinned = Self::is_full_sha(git_ref);
        debug!(owner, repo, git_ref, is_pinned, "parsed action reference");

        Some(ActionRef {
            full_ref: uses.to_string(),
            owner: owner.to_string(),
            // A sub-path after a second `/` stays part of `repo`.
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            is_pinned,
        })
    }

    fn is_full_sha(git_ref: &str) -> bool {
        git_ref.len() == 40 && git_ref.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// The `permissions:` field of a workflow or job.
///
/// The source format allows either a blanket string grant ("write-all",
/// "read-all") or a mapping of scope to access level. The two encodings
/// produce different findings, so the distinction is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permissions {
    /// No permissions block declared. Meaningful: the default token keeps
    /// its broad default access.
    Absent,
    /// A bare string grant applying to every scope, e.g. "write-all".
    Blanket(String),
    /// Per-scope grants, in declaration order.
    Scoped(Vec<(String, String)>),
}

impl Permissions {
    pub fn is_absent(&self) -> bool {
        matches!(self, Permissions::Absent)
    }

    pub fn is_blanket_write(&self) -> bool {
        matches!(self, Permissions::Blanket(level) if level == "write-all")
    }
}

/// One executable unit inside a job: an external action invocation, an
/// inline shell command, or (for malformed input) neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: Option<String>,
    pub uses: Option<ActionRef>,
    pub run: Option<String>,
    pub env: HashMap<String, String>,
    /// 1-based source line of the step in the workflow file.
    pub line: usize,
}

impl Step {
    /// Display name for reporting: explicit name, then action ref, then a
    /// placeholder.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Some(uses) = &self.uses {
            return uses.full_ref.clone();
        }
        "(unnamed step)".to_string()
    }
}

/// A named group of steps with its own optional permissions override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: Option<String>,
    pub runs_on: String,
    pub permissions: Permissions,
    pub steps: Vec<Step>,
    pub env: HashMap<String, String>,
    /// 1-based source line of the job in the workflow file.
    pub line: usize,
}

/// One parsed workflow document. Jobs are kept in declaration order so
/// findings are reproducible run to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub file_path: String,
    pub name: Option<String>,
    pub triggers: Vec<String>,
    pub permissions: Permissions,
    pub env: HashMap<String, String>,
    pub jobs: Vec<Job>,
}

impl Workflow {
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn step_count(&self) -> usize {
        self.jobs.iter().map(|j| j.steps.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_reference() {
        let r = ActionRef::parse("actions/checkout@v4").unwrap();
        assert_eq!(r.owner, "actions");
        assert_eq!(r.repo, "checkout");
        assert_eq!(r.git_ref, "v4");
        assert!(!r.is_pinned);
    }

    #[test]
    fn test_parse_sha_reference_is_pinned() {
        let sha = "a5ac7e51b41094c92402da3b24376905380afc29";
        let r = ActionRef::parse(&format!("actions/checkout@{sha}")).unwrap();
        assert!(r.is_pinned);
        assert_eq!(r.git_ref, sha);
    }

    #[test]
    fn test_short_sha_not_pinned() {
        let r = ActionRef::parse("actions/checkout@a5ac7e5").unwrap();
        assert!(!r.is_pinned);
    }

    #[test]
    fn test_uppercase_hex_counts_as_pinned() {
        let sha = "A5AC7E51B41094C92402DA3B24376905380AFC29";
        let r = ActionRef::parse(&format!("actions/checkout@{sha}")).unwrap();
        assert!(r.is_pinned);
    }

    #[test]
    fn test_branch_reference_not_pinned() {
        let r = ActionRef::parse("some-org/some-action@main").unwrap();
        assert!(!r.is_pinned);
    }

    #[test]
    fn test_subpath_keeps_owner_extraction() {
        let r = ActionRef::parse("github/codeql-action/upload-sarif@v3").unwrap();
        assert_eq!(r.owner, "github");
        assert_eq!(r.repo, "codeql-action/upload-sarif");
        assert_eq!(r.git_ref, "v3");
    }

    #[test]
    fn test_local_and_docker_refs_excluded() {
        assert!(ActionRef::parse("./.github/actions/build").is_none());
        assert!(ActionRef::parse("docker://alpine:3.19").is_none());
    }

    #[test]
    fn test_unversioned_ref_excluded() {
        assert!(ActionRef::parse("actions/checkout").is_none());
    }

    #[test]
    fn test_no_slash_excluded() {
        assert!(ActionRef::parse("checkout@v4").is_none());
    }

    #[test]
    fn test_permissions_predicates() {
        assert!(Permissions::Absent.is_absent());
        assert!(Permissions::Blanket("write-all".into()).is_blanket_write());
        assert!(!Permissions::Blanket("read-all".into()).is_blanket_write());
        let scoped = Permissions::Scoped(vec![("contents".into(), "write".into())]);
        assert!(!scoped.is_blanket_write());
        assert!(!scoped.is_absent());
    }
}
