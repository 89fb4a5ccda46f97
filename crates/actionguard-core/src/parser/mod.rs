pub mod lines;
pub mod model;
pub mod workflow;

pub use model::{ActionRef, Job, Permissions, Step, Workflow};
pub use workflow::{ParseError, WorkflowParser};
