//! Prompt text sent to the text-generation collaborator.
//!
//! Two prompts exist: the one-off schedule analysis requested at project
//! creation, and the per-turn status-update prompt built by the chat flow.

use std::fmt::Write as _;

use crate::transcript::Message;

/// Reply appended to the transcript when the generation call fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I had trouble processing that update. \
Could you please try again in a moment?";

/// Fixed role instruction opening every status-update prompt.
pub const CHAT_PREAMBLE: &str = "You are an AI Project Controls Agent collecting status \
updates from a contractor. Ask focused follow-up questions about progress, percent \
complete, schedule alignment, blockers, risks and next steps. Keep replies short and \
conversational, and ask one or two questions at a time.";

/// Project facts rendered into every status-update prompt.
#[derive(Debug, Clone, Copy)]
pub struct ProjectContext<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub tracking_focus_areas: &'a str,
    /// Stored schedule analysis, if one was produced at creation time.
    pub schedule_analysis: Option<&'a str>,
}

/// Opening assistant message of every chat session.
pub fn greeting(project_name: &str) -> String {
    format!(
        "Hello! I'm your AI Project Controls Agent for \"{project_name}\". I'm here to help \
         you provide detailed status updates. Let's start: what progress would you like to \
         report today?"
    )
}

/// Build the status-update prompt.
///
/// `history` must already be trimmed to the context window; it is rendered
/// one `role: text` line per entry, oldest first, before the new message.
pub fn chat_prompt(context: &ProjectContext<'_>, history: &[Message], new_message: &str) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(CHAT_PREAMBLE);
    prompt.push_str("\n\n");

    let _ = writeln!(prompt, "Project: {}", context.name);
    let _ = writeln!(prompt, "Description: {}", context.description);
    let _ = writeln!(prompt, "Tracking focus areas: {}", context.tracking_focus_areas);

    if let Some(analysis) = context.schedule_analysis {
        prompt.push_str("\nSchedule analysis:\n");
        prompt.push_str(analysis);
        prompt.push('\n');
    }

    if !history.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for message in history {
            let _ = writeln!(prompt, "{}: {}", message.role.as_str(), message.content);
        }
    }

    let _ = write!(
        prompt,
        "\nNew update from the contractor: {new_message}\n\nRespond as the agent."
    );
    prompt
}

/// Build the one-off schedule analysis prompt used at project creation.
pub fn schedule_analysis_prompt(name: &str, description: &str, tracking_focus_areas: &str) -> String {
    format!(
        "Analyze this project schedule and extract key information that would be useful \
         for tracking project progress. Focus on:\n\
         1. Major milestones and deliverables\n\
         2. Critical path activities\n\
         3. Key dependencies\n\
         4. Resource requirements\n\
         5. Timeline phases\n\n\
         Project: {name}\n\
         Description: {description}\n\
         Focus Areas: {tracking_focus_areas}\n\n\
         Provide a structured summary that an AI agent can use to ask intelligent \
         follow-up questions to contractors about project status."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Message, Transcript};

    fn context(analysis: Option<&str>) -> ProjectContext<'_> {
        ProjectContext {
            name: "Foundation Phase",
            description: "Pour and cure footings",
            tracking_focus_areas: "percent complete, blockers",
            schedule_analysis: analysis,
        }
    }

    #[test]
    fn includes_project_facts_verbatim() {
        let prompt = chat_prompt(&context(None), &[], "75% done, waiting on rebar");
        assert!(prompt.starts_with(CHAT_PREAMBLE));
        assert!(prompt.contains("Foundation Phase"));
        assert!(prompt.contains("Pour and cure footings"));
        assert!(prompt.contains("percent complete, blockers"));
        assert!(prompt.contains("75% done, waiting on rebar"));
    }

    #[test]
    fn analysis_present_only_when_given() {
        let without = chat_prompt(&context(None), &[], "hi");
        assert!(!without.contains("Schedule analysis:"));

        let with = chat_prompt(&context(Some("Milestone A due in May")), &[], "hi");
        assert!(with.contains("Schedule analysis:\nMilestone A due in May"));
    }

    #[test]
    fn history_rendered_as_role_lines() {
        let history = vec![
            Message::assistant("What progress today?"),
            Message::user("Forms are set"),
        ];
        let prompt = chat_prompt(&context(None), &history, "next");
        assert!(prompt.contains("assistant: What progress today?\nuser: Forms are set\n"));
    }

    #[test]
    fn long_transcript_only_last_six_reach_the_prompt() {
        let mut t = Transcript::new();
        for i in 0..20 {
            t.push(Message::user(format!("update-{i:02}")));
        }
        let prompt = chat_prompt(&context(None), t.context_window(), "latest");
        for i in 0..14 {
            assert!(!prompt.contains(&format!("update-{i:02}")), "entry {i} leaked");
        }
        for i in 14..20 {
            assert!(prompt.contains(&format!("update-{i:02}")), "entry {i} missing");
        }
    }

    #[test]
    fn greeting_names_project() {
        assert!(greeting("Foundation Phase").contains("\"Foundation Phase\""));
        assert_eq!(greeting("X"), greeting("X"));
    }

    #[test]
    fn analysis_prompt_carries_inputs() {
        let prompt = schedule_analysis_prompt("Tower", "Ten storeys", "cranes");
        assert!(prompt.contains("Project: Tower"));
        assert!(prompt.contains("Description: Ten storeys"));
        assert!(prompt.contains("Focus Areas: cranes"));
    }
}
