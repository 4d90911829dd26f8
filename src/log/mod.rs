//! Parsers for the two text artifacts each benchmark run leaves behind.

pub mod gprof;
pub mod run;

pub use gprof::{ProfileRecord, parse_gprof};
pub use run::{PhaseTimes, RunRecord, parse_run_log};
