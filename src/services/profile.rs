use serde::{Deserialize, Serialize};
use std::path::Path;

/// Facts about the portfolio owner that the chat persona is allowed to share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperProfile {
    pub name: String,
    pub role: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub passions: Vec<String>,
    pub projects: Vec<String>,
    pub availability: String,
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub linkedin: String,
    pub github: String,
}

impl Default for DeveloperProfile {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            name: "the site owner".to_string(),
            role: "Full Stack Developer".to_string(),
            location: "Earth".to_string(),
            skills: list(&["Rust", "TypeScript", "React", "Node.js", "PostgreSQL"]),
            experience: "2+ years".to_string(),
            education: "Self-taught".to_string(),
            passions: list(&["Clean Code", "User Experience", "Performance Optimization"]),
            projects: list(&["E-commerce platforms", "Dashboard applications", "REST APIs"]),
            availability: "Available for freelance projects".to_string(),
            contact: Contact {
                email: "hello@example.com".to_string(),
                linkedin: "https://www.linkedin.com/".to_string(),
                github: "https://github.com/".to_string(),
            },
        }
    }
}

impl DeveloperProfile {
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Persona instructions prepended to every visitor question
    pub fn persona_context(&self) -> String {
        format!(
            "You are an AI assistant representing {name}, a {role} from {location}.\n\
             \n\
             Developer Details:\n\
             - Skills: {skills}\n\
             - Experience: {experience}\n\
             - Education: {education}\n\
             - Passions: {passions}\n\
             - Projects: {projects}\n\
             - Availability: {availability}\n\
             - Contact: Email: {email}, LinkedIn: {linkedin}, GitHub: {github}\n\
             \n\
             Respond professionally, concisely and informatively. If the question is unrelated, \
             politely redirect to their skills, projects, or availability. Keep responses \
             conversational and short.",
            name = self.name,
            role = self.role,
            location = self.location,
            skills = self.skills.join(", "),
            experience = self.experience,
            education = self.education,
            passions = self.passions.join(", "),
            projects = self.projects.join(", "),
            availability = self.availability,
            email = self.contact.email,
            linkedin = self.contact.linkedin,
            github = self.contact.github,
        )
    }
}
