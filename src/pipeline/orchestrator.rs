//! Orchestrator: runs the four tasks strictly in order.
//!
//! Each step is one completion call that waits for the previous one. The
//! output of every finished step is kept and handed to later steps as
//! context. The first failure aborts the run; nothing partial is returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmSettings};
use crate::error::PipelineError;
use crate::knowledge::KnowledgeDocument;
use crate::llm::{CompletionRequest, FinishReason, LlmProvider};
use crate::pipeline::prompt::compose_messages;
use crate::pipeline::tasks::{Task, build_tasks};
use crate::pipeline::types::{PlanResult, ProgressEvent, StepOutput, TokenUsage};
use crate::profile::UserProfile;

/// Channel the orchestrator reports progress on.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Sampling settings applied to every step.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl From<&LlmSettings> for PipelineConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Sequential runner for the prompt chain.
pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: PipelineConfig) -> Self {
        Self { llm, config }
    }

    /// Run all four steps for a profile.
    ///
    /// Progress events are best-effort: a dropped receiver does not stop
    /// the run.
    pub async fn run(
        &self,
        profile: &UserProfile,
        knowledge: &[KnowledgeDocument],
        progress: Option<&ProgressSender>,
    ) -> Result<PlanResult, PipelineError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            model = self.llm.model_name(),
            documents = knowledge.len(),
            "Starting sustainable plan pipeline"
        );

        let tasks = build_tasks(profile);
        let mut outputs: Vec<StepOutput> = Vec::with_capacity(tasks.len());
        let mut usage = TokenUsage::default();

        for task in &tasks {
            emit(progress, ProgressEvent::StepStarted(task.step));
            let output = self
                .run_step(task, &outputs, knowledge)
                .await
                .inspect_err(|e| {
                    error!(run_id = %run_id, step = %task.step, error = %e, "Pipeline aborted");
                })?;
            usage.add(output.usage);
            outputs.push(output);
            emit(progress, ProgressEvent::StepCompleted(task.step));
        }

        let final_output = outputs
            .last()
            .map(|o| o.output.clone())
            .unwrap_or_default();
        let estimated_cost_usd = self.estimate_cost(usage);

        info!(
            run_id = %run_id,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cost_usd = %estimated_cost_usd,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sustainable plan complete"
        );

        Ok(PlanResult {
            run_id,
            model: self.llm.model_name().to_string(),
            final_output,
            steps: outputs,
            usage,
            estimated_cost_usd,
            generated_at: Utc::now(),
        })
    }

    async fn run_step(
        &self,
        task: &Task,
        prior: &[StepOutput],
        knowledge: &[KnowledgeDocument],
    ) -> Result<StepOutput, PipelineError> {
        let agent = task.agent();
        let started = Instant::now();
        info!(step = task.step.number(), role = agent.role, "Agent working");

        let request = CompletionRequest::new(compose_messages(task, prior, knowledge))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(|source| PipelineError::Generation {
                step: task.step,
                source,
            })?;

        let content = response.content.trim();
        if content.is_empty() {
            if response.finish_reason == FinishReason::Length {
                debug!(step = task.step.number(), "Response truncated with no content");
            }
            return Err(PipelineError::EmptyOutput { step: task.step });
        }

        let usage = TokenUsage {
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        };
        info!(
            step = task.step.number(),
            role = agent.role,
            tokens = usage.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Agent complete"
        );

        Ok(StepOutput {
            step: task.step,
            role: agent.role.to_string(),
            output: content.to_string(),
            usage,
        })
    }

    fn estimate_cost(&self, usage: TokenUsage) -> Decimal {
        let (input, output) = self.llm.cost_per_token();
        input * Decimal::from(usage.input_tokens) + output * Decimal::from(usage.output_tokens)
    }
}

fn emit(progress: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(tx) = progress {
        // Receiver gone means nobody is watching; keep going.
        let _ = tx.send(event);
    }
}
