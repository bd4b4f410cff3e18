pub mod orchestration;

pub use orchestration::{ReleasePlan, ReleaseWorkflow, ReleaseWorkflowArgs, WorkflowResult};
