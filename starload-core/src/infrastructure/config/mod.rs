pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use project::{CONFIG_FILE, database_location, load_project_config, scaffold_project};
