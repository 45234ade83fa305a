//! Sustainable plan prompt chain.
//!
//! A profile flows through four fixed steps:
//! 1. Knowledge gathering: reads the knowledge base
//! 2. Carbon estimate: sees step 1
//! 3. Weekly habit plan: sees steps 1-2
//! 4. Recommendations: sees steps 1-3
//!
//! The last step's text is the plan. Steps never run concurrently.

pub mod orchestrator;
pub mod prompt;
pub mod tasks;
pub mod types;

pub use orchestrator::{Orchestrator, PipelineConfig, ProgressSender};
pub use tasks::{Task, build_tasks};
pub use types::{PlanResult, ProgressEvent, Step, StepOutput, TokenUsage};
