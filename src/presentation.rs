//! Status board: per-agent idle/active/complete indicators.
//!
//! A pure view of the progress signal. It never decides anything; it just
//! folds `ProgressEvent`s into four statuses and renders them.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

use crate::pipeline::{ProgressEvent, Step};

/// Display status of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Active,
    Complete,
}

impl AgentStatus {
    fn css_class(self) -> &'static str {
        match self {
            AgentStatus::Idle => "agent-box",
            AgentStatus::Active => "agent-box agent-active",
            AgentStatus::Complete => "agent-box agent-complete",
        }
    }
}

/// Statuses of the four agents, indexed by step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusBoard {
    statuses: [AgentStatus; 4],
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, step: Step) -> AgentStatus {
        self.statuses[step.number() - 1]
    }

    pub fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::StepStarted(step) => self.statuses[step.number() - 1] = AgentStatus::Active,
            ProgressEvent::StepCompleted(step) => {
                self.statuses[step.number() - 1] = AgentStatus::Complete
            }
        }
    }

    /// Render the four agent boxes as HTML.
    pub fn render_html(&self) -> String {
        Step::ALL
            .iter()
            .map(|step| {
                let agent = step.agent();
                let status = self.status(*step);
                let caption = match status {
                    AgentStatus::Idle => agent.activity,
                    AgentStatus::Active => "🔄 Working...",
                    AgentStatus::Complete => "✅ Complete",
                };
                format!(
                    "<div class=\"{class}\" id=\"agent-{key}\" data-status=\"{status}\" \
                     data-activity=\"{activity}\">\
                     <strong>{title}</strong><br><small>{caption}</small></div>",
                    class = status.css_class(),
                    key = agent.key,
                    status = status_label(status),
                    activity = encode_double_quoted_attribute(agent.activity),
                    title = encode_text(agent.title),
                    caption = encode_text(caption),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One-line terminal rendering, e.g. `[✓ knowledge] [… carbon] [  habits] ...`.
    pub fn render_line(&self) -> String {
        Step::ALL
            .iter()
            .map(|step| {
                let mark = match self.status(*step) {
                    AgentStatus::Idle => ' ',
                    AgentStatus::Active => '…',
                    AgentStatus::Complete => '✓',
                };
                format!("[{mark} {}]", step.agent().key)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn status_label(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Idle => "idle",
        AgentStatus::Active => "active",
        AgentStatus::Complete => "complete",
    }
}
