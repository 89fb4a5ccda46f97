pub mod config;
pub mod enrich;
pub mod parser;
pub mod report;
pub mod rules;

pub use config::Config;
pub use enrich::{Enricher, Enrichment};
pub use parser::{ActionRef, Job, ParseError, Permissions, Step, Workflow, WorkflowParser};
pub use rules::{run_all, Finding, Severity, RULES};
