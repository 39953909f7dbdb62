pub mod dimension;
pub mod error;
pub mod fact;
pub mod metrics;
pub mod project;
pub mod run_log;
pub mod table;
pub mod validation;
pub mod value;
pub mod warehouse;
pub mod watermark;

// Short paths for the types every layer touches
pub use error::DomainError;
pub use table::Table;
pub use value::Value;
