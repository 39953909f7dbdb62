// starload-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Connector and Clock contracts
pub mod ports;

// 2. Domain
// Warehouse catalog, conformance rules, fact joins, watermarks, validation.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, config files, filesystem
pub mod infrastructure;

// 4. Application (Use Cases)
// Extraction, writers, incremental loads, refresh orchestration
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use starload_core::StarloadError;
pub use error::StarloadError;
