//! The four agent roles bound to the pipeline steps.
//!
//! An agent is plain configuration: a role, a goal and a backstory that
//! become the system prompt of its step, plus the labels the UI shows.

/// Role/goal/backstory record for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRole {
    /// Stable identifier used in logs and API payloads.
    pub key: &'static str,
    /// Heading in the status board.
    pub title: &'static str,
    /// Status board caption while idle.
    pub activity: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    /// Whether the step receives the knowledge base documents.
    pub uses_knowledge: bool,
}

impl AgentRole {
    /// System prompt for this agent's completion call.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}. {backstory}\nYour personal goal is: {goal}",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal,
        )
    }
}

pub const KNOWLEDGE_EXPERT: AgentRole = AgentRole {
    key: "knowledge",
    title: "📚 Agent 1: Knowledge Expert",
    activity: "Retrieving sustainability data (RAG)",
    role: "Sustainability Knowledge Expert",
    goal: "Provide accurate information about sustainable living practices using the knowledge base",
    backstory: "Expert in environmental science with access to comprehensive sustainability data",
    uses_knowledge: true,
};

pub const CARBON_ANALYZER: AgentRole = AgentRole {
    key: "carbon",
    title: "📊 Agent 2: Carbon Analyzer",
    activity: "Calculating your carbon footprint",
    role: "Carbon Footprint Analyzer",
    goal: "Calculate and analyze carbon footprint based on user activities",
    backstory: "Environmental data scientist specializing in carbon emission calculations",
    uses_knowledge: false,
};

pub const HABIT_COACH: AgentRole = AgentRole {
    key: "habits",
    title: "📅 Agent 3: Habit Coach",
    activity: "Creating weekly sustainable routine",
    role: "Sustainable Habit Coach",
    goal: "Create personalized sustainable habits and weekly routines",
    backstory: "Behavioral psychologist focused on building sustainable lifestyle habits",
    uses_knowledge: false,
};

pub const ECO_ADVISOR: AgentRole = AgentRole {
    key: "recommendations",
    title: "💡 Agent 4: Recommendation Engine",
    activity: "Generating personalized recommendations",
    role: "Eco-Friendly Advisor",
    goal: "Provide actionable eco-friendly recommendations tailored to user lifestyle",
    backstory: "Sustainability consultant with expertise in practical green living solutions",
    uses_knowledge: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_includes_role_goal_and_backstory() {
        let prompt = CARBON_ANALYZER.system_prompt();
        assert!(prompt.starts_with("You are Carbon Footprint Analyzer."));
        assert!(prompt.contains("Environmental data scientist"));
        assert!(prompt.contains("Your personal goal is: Calculate and analyze"));
    }

    #[test]
    fn only_the_knowledge_expert_reads_documents() {
        assert!(KNOWLEDGE_EXPERT.uses_knowledge);
        assert!(!CARBON_ANALYZER.uses_knowledge);
        assert!(!HABIT_COACH.uses_knowledge);
        assert!(!ECO_ADVISOR.uses_knowledge);
    }
}
