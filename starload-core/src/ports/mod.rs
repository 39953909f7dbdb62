// starload-core/src/ports/mod.rs

pub mod clock;
pub mod connector;

pub use clock::{Clock, FixedClock, SystemClock};
pub use connector::{ColumnSchema, Connector, SqlStatement};
