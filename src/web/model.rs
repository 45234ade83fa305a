//! Wire types for the web UI: WebSocket messages and JSON API bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::{PlanResult, ProgressEvent, Step, StepOutput, TokenUsage};
use crate::presentation::AgentStatus;
use crate::profile::UserProfile;

/// Messages sent from server to client over `/ws`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// An agent changed status.
    StepUpdate { step: Step, status: AgentStatus },
    /// All four steps finished.
    PlanComplete {
        plan: String,
        usage: TokenUsage,
        estimated_cost_usd: Decimal,
    },
    /// The run failed or was never started.
    PlanError { message: String },
}

impl From<ProgressEvent> for WsMessage {
    fn from(event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::StepStarted(step) => WsMessage::StepUpdate {
                step,
                status: AgentStatus::Active,
            },
            ProgressEvent::StepCompleted(step) => WsMessage::StepUpdate {
                step,
                status: AgentStatus::Complete,
            },
        }
    }
}

/// Urlencoded body of the HTML form.
///
/// Browsers always send every input, so fields are plain strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanForm {
    #[serde(default)]
    pub transportation: String,
    #[serde(default)]
    pub diet: String,
    #[serde(default)]
    pub energy_usage: String,
    #[serde(default)]
    pub goals: String,
}

impl From<PlanForm> for UserProfile {
    fn from(form: PlanForm) -> Self {
        UserProfile {
            transportation: Some(form.transportation),
            diet: Some(form.diet),
            energy_usage: Some(form.energy_usage),
            goals: Some(form.goals),
        }
    }
}

/// Successful `/api/plan` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub run_id: Uuid,
    pub model: String,
    pub plan: String,
    pub steps: Vec<StepOutput>,
    pub usage: TokenUsage,
    pub estimated_cost_usd: Decimal,
}

impl From<PlanResult> for PlanResponse {
    fn from(result: PlanResult) -> Self {
        Self {
            run_id: result.run_id,
            model: result.model,
            plan: result.final_output,
            steps: result.steps,
            usage: result.usage,
            estimated_cost_usd: result.estimated_cost_usd,
        }
    }
}

/// Error body for the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
