//! Turns a task, its context, and knowledge documents into chat messages.

use crate::knowledge::KnowledgeDocument;
use crate::llm::ChatMessage;
use crate::pipeline::tasks::Task;
use crate::pipeline::types::StepOutput;

/// Build the messages for one step.
///
/// `prior` must hold the outputs of the steps listed in `task.context`, in
/// order; other outputs are ignored. Knowledge documents are only attached
/// when the task's agent reads the knowledge base.
pub fn compose_messages(
    task: &Task,
    prior: &[StepOutput],
    knowledge: &[KnowledgeDocument],
) -> Vec<ChatMessage> {
    let agent = task.agent();
    let mut user = String::new();

    user.push_str(&format!("Current Task: {}\n\n", task.description));
    user.push_str(&format!(
        "This is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.expected_output
    ));

    if agent.uses_knowledge {
        user.push_str("\n\n# Knowledge base\n\n");
        if knowledge.is_empty() {
            user.push_str("(no documents available; rely on established sustainability data)");
        } else {
            let docs: Vec<String> = knowledge
                .iter()
                .map(|doc| format!("## {}\n\n{}", doc.name, doc.content.trim()))
                .collect();
            user.push_str(&docs.join("\n\n"));
        }
    }

    let context = render_context(task, prior);
    if !context.is_empty() {
        user.push_str("\n\nThis is the context you're working with:\n");
        user.push_str(&context);
    }

    user.push_str("\n\nBegin! Give your best complete final answer.");

    vec![ChatMessage::system(agent.system_prompt()), ChatMessage::user(user)]
}

/// Concatenate the outputs of the task's context steps, in step order.
pub fn render_context(task: &Task, prior: &[StepOutput]) -> String {
    task.context
        .iter()
        .filter_map(|step| prior.iter().find(|o| o.step == *step))
        .map(|o| format!("### {}\n{}", o.role, o.output.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
