//! Scan cycle handling

pub mod context;
pub mod handlers;

pub use context::CycleContext;
pub use handlers::{handle_scan_result, run_cycle, CycleSummary};
