//! The four fixed task templates.

use crate::agents::AgentRole;
use crate::pipeline::types::Step;
use crate::profile::UserProfile;

/// One templated step of the chain, built fresh for each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub step: Step,
    pub description: String,
    pub expected_output: &'static str,
    /// Earlier steps whose outputs are supplied as context, in order.
    pub context: &'static [Step],
}

impl Task {
    pub fn agent(&self) -> &'static AgentRole {
        self.step.agent()
    }
}

/// Build the four tasks for a profile, in execution order.
pub fn build_tasks(profile: &UserProfile) -> [Task; 4] {
    Step::ALL.map(|step| build_task(step, profile))
}

/// Build a single task from its template.
pub fn build_task(step: Step, profile: &UserProfile) -> Task {
    let (description, expected_output) = match step {
        Step::Knowledge => (
            format!(
                "Research and compile relevant sustainability information for:\n\
                 - Transportation: {}\n\
                 - Diet: {}\n\
                 - Energy usage: {}\n\
                 Use the knowledge base to provide accurate data.",
                profile.transportation(),
                profile.diet(),
                profile.energy_usage(),
            ),
            "Comprehensive sustainability information relevant to user profile",
        ),
        Step::Carbon => (
            format!(
                "Calculate the estimated annual carbon footprint based on:\n\
                 - Transportation: {}\n\
                 - Diet: {}\n\
                 - Energy usage: {}\n\
                 Provide breakdown by category and total CO2 tons per year.",
                profile.transportation(),
                profile.diet(),
                profile.energy_usage(),
            ),
            "Detailed carbon footprint calculation with breakdown",
        ),
        Step::Habits => (
            format!(
                "Design a weekly sustainable routine with daily habits to achieve:\n\
                 Goals: {}\n\
                 Include specific, measurable habits for each day of the week.",
                profile.goals(),
            ),
            "7-day sustainable routine with daily actionable habits",
        ),
        Step::Recommendations => (
            format!(
                "Provide top 5 personalized eco-friendly recommendations based on:\n\
                 - Current carbon footprint analysis\n\
                 - User goals: {}\n\
                 Prioritize high-impact, practical changes.",
                profile.goals(),
            ),
            "Top 5 prioritized eco-friendly recommendations with expected impact",
        ),
    };

    Task {
        step,
        description,
        expected_output,
        context: step.context(),
    }
}
