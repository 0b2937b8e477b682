//! Prompt Builder
//!
//! Standardized prompt construction for agent calls. Sections render in the
//! order they are added, so identical inputs always produce identical prompts.

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Free-form instructions
    Instructions(String),
    /// One named input field
    Input { name: String, value: String },
    /// Expected output fields with descriptions
    Outputs(Vec<(String, String)>),
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn instructions(mut self, text: &str) -> Self {
        self.sections
            .push(PromptSection::Instructions(text.trim().to_string()));
        self
    }

    pub fn input(mut self, name: &str, value: &str) -> Self {
        self.sections.push(PromptSection::Input {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn outputs<'a>(mut self, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.sections.push(PromptSection::Outputs(
            fields
                .into_iter()
                .map(|(n, d)| (n.to_string(), d.to_string()))
                .collect(),
        ));
        self
    }

    pub fn focus(mut self, target: &str, restrictions: &[&str]) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();
        let mut inputs_open = false;

        for section in self.sections {
            let is_input = matches!(section, PromptSection::Input { .. });
            if inputs_open && !is_input {
                prompt.push_str("</INPUTS>\n\n");
                inputs_open = false;
            }

            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Instructions(text) => {
                    prompt.push_str("<INSTRUCTIONS>\n");
                    prompt.push_str(&text);
                    prompt.push_str("\n</INSTRUCTIONS>\n\n");
                }
                PromptSection::Input { name, value } => {
                    if !inputs_open {
                        prompt.push_str("<INPUTS>\n");
                        inputs_open = true;
                    }
                    prompt.push_str(&format!("## {}\n{}\n\n", name, value.trim_end()));
                }
                PromptSection::Outputs(fields) => {
                    prompt.push_str("<OUTPUT_FIELDS>\n");
                    for (name, description) in fields {
                        prompt.push_str(&format!("- {}: {}\n", name, description));
                    }
                    prompt.push_str("</OUTPUT_FIELDS>\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
            }
        }

        if inputs_open {
            prompt.push_str("</INPUTS>\n\n");
        }

        prompt.trim_end().to_string()
    }
}
