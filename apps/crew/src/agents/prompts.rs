// Prompt templates for LLM interactions
//
// Templates use `{{name}}` placeholders. Rendering is a single pass, so
// substituted values are never re-scanned for placeholders.

use std::collections::HashMap;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// Render the system prompt with variables
    pub fn render_system(&self, variables: &HashMap<&str, &str>) -> String {
        substitute(&self.system, variables)
    }

    /// Render the user template with variables
    pub fn render(&self, variables: &HashMap<&str, &str>) -> String {
        substitute(&self.user_template, variables)
    }
}

/// Replace `{{key}}` placeholders; unknown keys are left untouched
pub fn substitute(template: &str, variables: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

/// Context block appended to a task prompt, empty when there is no context
pub fn context_section(context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("\n\nThis is the context you're working with:\n{}", ctx)
        }
        _ => String::new(),
    }
}

pub mod library {
    use super::PromptTemplate;

    /// Persona system prompt plus the task prompt sent to an agent
    pub fn task_execution() -> PromptTemplate {
        PromptTemplate {
            name: "task_execution".to_string(),
            version: "1.0.0".to_string(),
            system: "You are {{role}}. {{backstory}}\n\
                     Your personal goal is: {{goal}}\n\n\
                     Use the available tools when you need information from the project. \
                     When you have everything you need, reply with your complete final answer \
                     and no further tool calls."
                .to_string(),
            user_template: "Current Task: {{description}}\n\n\
                            This is the expected criteria for your final answer: {{expected_output}}\n\
                            You MUST return the actual complete content as the final answer, \
                            not a summary.{{context}}\n\n\
                            Begin! This is VERY important to you, use the tools available and \
                            give your best Final Answer, your job depends on it!"
                .to_string(),
        }
    }

    /// Sent once the tool-call budget is spent
    pub fn force_final_answer() -> PromptTemplate {
        PromptTemplate {
            name: "force_final_answer".to_string(),
            version: "1.0.0".to_string(),
            system: String::new(),
            user_template: "You have used the maximum number of tool calls allowed. \
                            Now give your best complete final answer using what you \
                            have gathered so far."
                .to_string(),
        }
    }

    /// Ad-hoc task handed to a coworker through delegation
    pub fn delegation() -> PromptTemplate {
        PromptTemplate {
            name: "delegation".to_string(),
            version: "1.0.0".to_string(),
            system: String::new(),
            user_template: "Your best answer to your coworker asking you this, \
                            accounting for the context shared."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let vars = HashMap::from([("role", "Tech Lead"), ("goal", "Ship it")]);

        assert_eq!(
            substitute("{{role}} wants to {{ goal }}.", &vars),
            "Tech Lead wants to Ship it."
        );
    }

    #[test]
    fn leaves_unknown_and_unterminated_placeholders() {
        let vars = HashMap::from([("role", "Reviewer")]);

        assert_eq!(substitute("{{role}} {{missing}}", &vars), "Reviewer {{missing}}");
        assert_eq!(substitute("open {{role", &vars), "open {{role");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let vars = HashMap::from([("context", "{{goal}}"), ("goal", "leak")]);

        assert_eq!(substitute("{{context}}", &vars), "{{goal}}");
    }

    #[test]
    fn context_section_only_when_present() {
        assert_eq!(context_section(None), "");
        assert_eq!(context_section(Some("  ")), "");
        assert!(context_section(Some("report")).ends_with("working with:\nreport"));
    }

    #[test]
    fn task_template_renders_all_parts() {
        let template = library::task_execution();
        let context = context_section(Some("prior analysis"));
        let vars = HashMap::from([
            ("description", "Review the plan"),
            ("expected_output", "A review report"),
            ("context", context.as_str()),
        ]);

        let prompt = template.render(&vars);

        assert!(prompt.starts_with("Current Task: Review the plan"));
        assert!(prompt.contains("A review report"));
        assert!(prompt.contains("prior analysis"));
        assert!(!prompt.contains("{{"));
    }
}
