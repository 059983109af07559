pub mod health;
pub mod issue_templates;
pub mod settings;
pub mod template_content;
