pub mod caller;
pub mod issue_template;
pub mod plugin_settings;

pub use caller::*;
pub use issue_template::*;
pub use plugin_settings::*;
