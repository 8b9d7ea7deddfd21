//! Scan orchestration: fan-out, ranking and scheduling

pub mod ranking;
pub mod scanner;
pub mod scheduler;

pub use ranking::{apply_quality_filter, rank_signals};
pub use scanner::Scanner;
pub use scheduler::ScanScheduler;
