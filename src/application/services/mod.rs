pub mod position_service;
pub mod settings_service;
pub mod template_resolver;
pub mod template_service;

pub use position_service::{MoveOutcome, PositionService, ReorderDirection};
pub use settings_service::SettingsService;
pub use template_resolver::{ContentQuery, TemplateResolver};
pub use template_service::{TemplateIndex, TemplateService};
