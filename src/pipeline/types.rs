//! Types for the prompt chain: steps, progress events, and results.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::{self, AgentRole};

/// One of the four fixed pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Knowledge,
    Carbon,
    Habits,
    Recommendations,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 4] = [
        Step::Knowledge,
        Step::Carbon,
        Step::Habits,
        Step::Recommendations,
    ];

    /// 1-based position in the chain.
    pub fn number(self) -> usize {
        match self {
            Step::Knowledge => 1,
            Step::Carbon => 2,
            Step::Habits => 3,
            Step::Recommendations => 4,
        }
    }

    pub fn agent(self) -> &'static AgentRole {
        match self {
            Step::Knowledge => &agents::KNOWLEDGE_EXPERT,
            Step::Carbon => &agents::CARBON_ANALYZER,
            Step::Habits => &agents::HABIT_COACH,
            Step::Recommendations => &agents::ECO_ADVISOR,
        }
    }

    /// Earlier steps whose outputs this step receives as context.
    pub fn context(self) -> &'static [Step] {
        match self {
            Step::Knowledge => &[],
            Step::Carbon => &[Step::Knowledge],
            Step::Habits => &[Step::Knowledge, Step::Carbon],
            Step::Recommendations => &[Step::Knowledge, Step::Carbon, Step::Habits],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent().key)
    }
}

/// Linear progress signal emitted by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "step", rename_all = "snake_case")]
pub enum ProgressEvent {
    StepStarted(Step),
    StepCompleted(Step),
}

/// Token usage accumulated across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// Text produced by one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    pub step: Step,
    pub role: String,
    pub output: String,
    pub usage: TokenUsage,
}

/// Result of a full pipeline run.
///
/// `final_output` is the last step's text, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub run_id: Uuid,
    pub model: String,
    pub final_output: String,
    pub steps: Vec<StepOutput>,
    pub usage: TokenUsage,
    pub estimated_cost_usd: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl PlanResult {
    /// Every step's output concatenated under its agent's heading.
    pub fn trace(&self) -> String {
        self.steps
            .iter()
            .map(|s| {
                format!(
                    "## Step {}: {}\n\n{}",
                    s.step.number(),
                    s.role,
                    s.output.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for PlanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.final_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_numbered_in_order() {
        let numbers: Vec<usize> = Step::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn context_is_every_earlier_step() {
        assert!(Step::Knowledge.context().is_empty());
        assert_eq!(Step::Carbon.context(), &[Step::Knowledge]);
        assert_eq!(Step::Habits.context(), &[Step::Knowledge, Step::Carbon]);
        assert_eq!(
            Step::Recommendations.context(),
            &[Step::Knowledge, Step::Carbon, Step::Habits]
        );
    }

    #[test]
    fn progress_event_wire_format() {
        let json = serde_json::to_value(ProgressEvent::StepStarted(Step::Habits)).unwrap();
        assert_eq!(json, serde_json::json!({"event": "step_started", "step": "habits"}));
    }

    #[test]
    fn display_is_final_output_and_trace_lists_steps() {
        let result = PlanResult {
            run_id: Uuid::new_v4(),
            model: "stub".into(),
            final_output: "1. Take the train".into(),
            steps: vec![
                StepOutput {
                    step: Step::Knowledge,
                    role: "Sustainability Knowledge Expert".into(),
                    output: "facts\n".into(),
                    usage: TokenUsage::default(),
                },
                StepOutput {
                    step: Step::Recommendations,
                    role: "Eco-Friendly Advisor".into(),
                    output: "1. Take the train".into(),
                    usage: TokenUsage::default(),
                },
            ],
            usage: TokenUsage::default(),
            estimated_cost_usd: Decimal::ZERO,
            generated_at: Utc::now(),
        };
        assert_eq!(result.to_string(), "1. Take the train");
        assert_eq!(
            result.trace(),
            "## Step 1: Sustainability Knowledge Expert\n\nfacts\n\n\
             ## Step 4: Eco-Friendly Advisor\n\n1. Take the train"
        );
    }

    #[test]
    fn usage_totals_saturate() {
        let usage = TokenUsage {
            input_tokens: u32::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total(), u32::MAX);

        let mut sum = TokenUsage {
            input_tokens: 10,
            output_tokens: u32::MAX - 1,
        };
        sum.add(TokenUsage {
            input_tokens: 5,
            output_tokens: 7,
        });
        assert_eq!(sum.input_tokens, 15);
        assert_eq!(sum.output_tokens, u32::MAX);
        assert_eq!(sum.total(), u32::MAX);
    }
}
