// starload-core/src/application/mod.rs

pub mod bootstrap;
pub mod extract;
pub mod fact_loader;
pub mod freshness;
pub mod inspect;
pub mod metrics;
pub mod pipeline;
pub mod run_log;
pub mod status;
pub mod writer;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use starload_core::application::{run_refresh, warehouse_status};`

pub use bootstrap::bootstrap_warehouse;
pub use extract::SourceExtractor;
pub use fact_loader::{FactLoad, load_fact, probe_watermark};
pub use freshness::check_freshness;
pub use inspect::preview_table;
pub use metrics::load_sales_metrics;
pub use pipeline::{RefreshContext, RunReport, run_refresh};
pub use status::{WarehouseStatus, warehouse_status};
pub use writer::write_dimension;
