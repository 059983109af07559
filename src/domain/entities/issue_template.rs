use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const MAX_NAME_LENGTH: usize = 255;

/// Partition of templates within which positions are unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Creation,
    StatusChange,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Creation => "creation",
            TemplateType::StatusChange => "status_change",
        }
    }

    pub fn all() -> [TemplateType; 2] {
        [TemplateType::Creation, TemplateType::StatusChange]
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creation" => Ok(TemplateType::Creation),
            "status_change" => Ok(TemplateType::StatusChange),
            other => Err(DomainError::ValidationError(format!(
                "Template type must be 'creation' or 'status_change', got '{}'",
                other
            ))),
        }
    }
}

/// Which neighbour a template trades places with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

impl ReorderDirection {
    /// Index of the neighbour in a list of `len` templates, if there is one.
    pub fn neighbor_index(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            ReorderDirection::Up => index.checked_sub(1),
            ReorderDirection::Down => (index + 1 < len).then_some(index + 1),
        }
    }
}

impl FromStr for ReorderDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ReorderDirection::Up),
            "down" => Ok(ReorderDirection::Down),
            other => Err(DomainError::ValidationError(format!(
                "Invalid direction: {}",
                other
            ))),
        }
    }
}

/// Stored issue template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub template_type: TemplateType,
    pub project_id: Option<i64>,   // None = any project
    pub tracker_id: Option<i64>,   // None = any tracker (creation only)
    pub issue_status_id: Option<i64>, // None = any status (status change only)
    pub position: i64,
    pub is_global: bool,
    pub enabled: bool,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

impl IssueTemplate {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.content, Some(self.position))
    }

    /// Whether anyone may read this template without a project permission check.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_global || self.project_id.is_none()
    }

    /// Ordering used when reordering within a scope: `(position, id)`.
    pub fn cmp_scope_order(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Ordering used when presenting templates: `(position, name)`.
    pub fn cmp_display_order(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Insert payload for the template store
#[derive(Debug, Clone)]
pub struct NewIssueTemplate {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub template_type: TemplateType,
    pub project_id: Option<i64>,
    pub tracker_id: Option<i64>,
    pub issue_status_id: Option<i64>,
    pub position: Option<i64>,
    pub is_global: bool,
    pub enabled: bool,
}

impl NewIssueTemplate {
    pub fn new(name: impl Into<String>, content: impl Into<String>, template_type: TemplateType) -> Self {
        Self {
            name: name.into(),
            description: None,
            content: content.into(),
            template_type,
            project_id: None,
            tracker_id: None,
            issue_status_id: None,
            position: None,
            is_global: false,
            enabled: true,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.content, self.position)
    }
}

/// Partial update. `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default)]
pub struct IssueTemplatePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub content: Option<String>,
    pub template_type: Option<TemplateType>,
    pub project_id: Option<Option<i64>>,
    pub tracker_id: Option<Option<i64>>,
    pub issue_status_id: Option<Option<i64>>,
    pub position: Option<i64>,
    pub is_global: Option<bool>,
    pub enabled: Option<bool>,
}

impl IssueTemplatePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.template_type.is_none()
            && self.project_id.is_none()
            && self.tracker_id.is_none()
            && self.issue_status_id.is_none()
            && self.position.is_none()
            && self.is_global.is_none()
            && self.enabled.is_none()
    }

    pub fn apply_to(&self, template: &mut IssueTemplate) {
        if let Some(name) = &self.name {
            template.name = name.clone();
        }
        if let Some(description) = &self.description {
            template.description = description.clone();
        }
        if let Some(content) = &self.content {
            template.content = content.clone();
        }
        if let Some(template_type) = self.template_type {
            template.template_type = template_type;
        }
        if let Some(project_id) = self.project_id {
            template.project_id = project_id;
        }
        if let Some(tracker_id) = self.tracker_id {
            template.tracker_id = tracker_id;
        }
        if let Some(issue_status_id) = self.issue_status_id {
            template.issue_status_id = issue_status_id;
        }
        if let Some(position) = self.position {
            template.position = position;
        }
        if let Some(is_global) = self.is_global {
            template.is_global = is_global;
        }
        if let Some(enabled) = self.enabled {
            template.enabled = enabled;
        }
    }
}

fn validate_fields(name: &str, content: &str, position: Option<i64>) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Name cannot be blank".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::ValidationError(format!(
            "Name is too long (maximum is {} characters)",
            MAX_NAME_LENGTH
        )));
    }

    if content.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Content cannot be blank".to_string(),
        ));
    }

    if let Some(position) = position {
        if position < 1 {
            return Err(DomainError::ValidationError(
                "Position must be a positive integer".to_string(),
            ));
        }
    }

    Ok(())
}

/// Predicate on a nullable reference column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    #[default]
    Any,
    IsNull,
    Equals(i64),
    NullOrEquals(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateOrder {
    #[default]
    PositionName,
    PositionId,
    /// Admin index: type, project, tracker, position
    Grouped,
}

/// Scope query against the template store
#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    pub template_type: Option<TemplateType>,
    pub enabled_only: bool,
    pub project: ScopeFilter,
    pub tracker: ScopeFilter,
    pub status: ScopeFilter,
    pub is_global: Option<bool>,
    pub order: TemplateOrder,
}

impl TemplateQuery {
    pub fn of_type(template_type: TemplateType) -> Self {
        Self {
            template_type: Some(template_type),
            ..Self::default()
        }
    }

    pub fn enabled(mut self) -> Self {
        self.enabled_only = true;
        self
    }

    pub fn project(mut self, filter: ScopeFilter) -> Self {
        self.project = filter;
        self
    }

    pub fn tracker(mut self, filter: ScopeFilter) -> Self {
        self.tracker = filter;
        self
    }

    pub fn status(mut self, filter: ScopeFilter) -> Self {
        self.status = filter;
        self
    }

    pub fn global(mut self) -> Self {
        self.is_global = Some(true);
        self
    }

    pub fn ordered_by(mut self, order: TemplateOrder) -> Self {
        self.order = order;
        self
    }
}

/// Public projection returned by the content endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateContent {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
}

impl From<IssueTemplate> for TemplateContent {
    fn from(template: IssueTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name,
            description: template.description,
            content: template.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: i64, name: &str, position: i64) -> IssueTemplate {
        IssueTemplate {
            id,
            name: name.to_string(),
            description: None,
            content: "## Body".to_string(),
            template_type: TemplateType::Creation,
            project_id: None,
            tracker_id: None,
            issue_status_id: None,
            position,
            is_global: false,
            enabled: true,
            created_at: "2026-01-13T10:00:00Z".to_string(),
            updated_at: "2026-01-13T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_template_type_parsing() {
        assert_eq!("creation".parse::<TemplateType>().unwrap(), TemplateType::Creation);
        assert_eq!(
            "status_change".parse::<TemplateType>().unwrap(),
            TemplateType::StatusChange
        );
        assert!(matches!(
            "statusChange".parse::<TemplateType>(),
            Err(DomainError::ValidationError(_))
        ));
        assert!("".parse::<TemplateType>().is_err());
    }

    #[test]
    fn test_template_type_serde_names() {
        let json = serde_json::to_string(&TemplateType::StatusChange).unwrap();
        assert_eq!(json, "\"status_change\"");
    }

    #[test]
    fn test_template_validation() {
        let mut t = template(1, "Bug Report", 1);
        assert!(t.validate().is_ok());

        t.name = "   ".to_string();
        assert!(t.validate().is_err());

        t.name = "a".repeat(256);
        assert!(t.validate().is_err());

        t.name = "a".repeat(255);
        assert!(t.validate().is_ok());

        t.content = "".to_string();
        assert!(t.validate().is_err());

        t.content = "body".to_string();
        t.position = 0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_scope_order_breaks_ties_by_id() {
        let a = template(2, "A", 3);
        let b = template(1, "B", 3);
        assert_eq!(a.cmp_scope_order(&b), Ordering::Greater);

        let c = template(5, "C", 1);
        assert_eq!(c.cmp_scope_order(&a), Ordering::Less);
    }

    #[test]
    fn test_display_order_breaks_ties_by_name() {
        let a = template(2, "Alpha", 3);
        let b = template(1, "Beta", 3);
        assert_eq!(a.cmp_display_order(&b), Ordering::Less);
    }

    #[test]
    fn test_patch_clears_nullable_fields() {
        let mut t = template(1, "Bug Report", 1);
        t.project_id = Some(7);
        t.description = Some("old".to_string());

        let patch = IssueTemplatePatch {
            project_id: Some(None),
            description: Some(None),
            enabled: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut t);

        assert_eq!(t.project_id, None);
        assert_eq!(t.description, None);
        assert!(!t.enabled);
        assert_eq!(t.name, "Bug Report");
    }

    #[test]
    fn test_publicly_visible() {
        let mut t = template(1, "Scoped", 1);
        assert!(t.is_publicly_visible());

        t.project_id = Some(3);
        assert!(!t.is_publicly_visible());

        t.is_global = true;
        assert!(t.is_publicly_visible());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<ReorderDirection>().unwrap(), ReorderDirection::Up);
        assert_eq!(
            "down".parse::<ReorderDirection>().unwrap(),
            ReorderDirection::Down
        );
        assert!(matches!(
            "sideways".parse::<ReorderDirection>(),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_neighbor_index_at_edges() {
        assert_eq!(ReorderDirection::Up.neighbor_index(0, 3), None);
        assert_eq!(ReorderDirection::Down.neighbor_index(2, 3), None);
        assert_eq!(ReorderDirection::Up.neighbor_index(1, 3), Some(0));
        assert_eq!(ReorderDirection::Down.neighbor_index(1, 3), Some(2));
        assert_eq!(ReorderDirection::Down.neighbor_index(0, 1), None);
    }
}
