//! Sweep configuration: which (n, np, threads) points were probed, and where
//! their log files live.
//!
//! A sweep is the full cross product of three integer dimensions: problem
//! size (n), MPI process count (np), and OpenMP thread count. Each grid
//! point maps to exactly two files under the log directory, written by the
//! benchmark driver:
//!
//! run_n{n}_np{np}_threads{t}.log    stdout + /usr/bin/time output
//! gprof_n{n}_np{np}_threads{t}.txt  gprof flat-profile dump

use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_problem_sizes() -> Vec<u32> {
    vec![4, 5, 6, 7]
}

fn default_process_counts() -> Vec<u32> {
    vec![1, 2, 4]
}

fn default_thread_counts() -> Vec<u32> {
    vec![1, 2, 4]
}

/// Swept dimension values, optionally loaded from a small JSON file:
///
/// {
///   "problem_sizes": [4, 5, 6, 7],
///   "process_counts": [1, 2, 4],
///   "thread_counts": [1, 2, 4]
/// }
///
/// Absent fields fall back to the defaults above (the original sweep).
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_problem_sizes")]
    pub problem_sizes: Vec<u32>,

    #[serde(default = "default_process_counts")]
    pub process_counts: Vec<u32>,

    #[serde(default = "default_thread_counts")]
    pub thread_counts: Vec<u32>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            problem_sizes: default_problem_sizes(),
            process_counts: default_process_counts(),
            thread_counts: default_thread_counts(),
        }
    }
}

impl SweepConfig {
    pub fn from_json_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read sweep config {}", path))?;
        let cfg: SweepConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse sweep config {}", path))?;
        Ok(cfg)
    }

    /// Full cross product as an ordered sequence: problem size outermost,
    /// process count next, thread count innermost.
    pub fn grid(&self) -> Vec<RunId> {
        let mut out = Vec::with_capacity(
            self.problem_sizes.len() * self.process_counts.len() * self.thread_counts.len(),
        );
        for &size in &self.problem_sizes {
            for &procs in &self.process_counts {
                for &threads in &self.thread_counts {
                    out.push(RunId {
                        size,
                        procs,
                        threads,
                    });
                }
            }
        }
        out
    }
}

/// Identifies one benchmark run within a sweep.
///
/// Derives ordering so it can key a BTreeMap directly, instead of navigating
/// size -> procs -> threads nested containers. Absent keys then mean "no log
/// file for this run", never a zero-filled placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId {
    pub size: u32,
    pub procs: u32,
    pub threads: u32,
}

impl RunId {
    pub fn new(size: u32, procs: u32, threads: u32) -> Self {
        Self {
            size,
            procs,
            threads,
        }
    }

    /// Path of the run log for this grid point. Pure computation; the caller
    /// decides what a missing file means.
    pub fn run_log_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "run_n{}_np{}_threads{}.log",
            self.size, self.procs, self.threads
        ))
    }

    /// Path of the gprof flat-profile dump for this grid point.
    pub fn gprof_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "gprof_n{}_np{}_threads{}.txt",
            self.size, self.procs, self.threads
        ))
    }

    /// Axis label used by every chart: "np=2, t=4".
    pub fn label(&self) -> String {
        format!("np={}, t={}", self.procs, self.threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn grid_orders_size_then_procs_then_threads() {
        let cfg = SweepConfig {
            problem_sizes: vec![4, 5],
            process_counts: vec![1, 2],
            thread_counts: vec![1, 2],
        };
        let grid = cfg.grid();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid[0], RunId::new(4, 1, 1));
        assert_eq!(grid[1], RunId::new(4, 1, 2));
        assert_eq!(grid[2], RunId::new(4, 2, 1));
        assert_eq!(grid[4], RunId::new(5, 1, 1));
        assert_eq!(grid[7], RunId::new(5, 2, 2));
    }

    #[test]
    fn grid_is_deterministic() {
        let cfg = SweepConfig::default();
        assert_eq!(cfg.grid(), cfg.grid());
    }

    #[test]
    fn paths_follow_driver_naming() {
        let id = RunId::new(6, 2, 4);
        let dir = Path::new("build");
        assert_eq!(
            id.run_log_path(dir),
            Path::new("build").join("run_n6_np2_threads4.log")
        );
        assert_eq!(
            id.gprof_path(dir),
            Path::new("build").join("gprof_n6_np2_threads4.txt")
        );
    }

    #[test]
    fn config_json_fills_missing_fields_with_defaults() {
        let cfg: SweepConfig = serde_json::from_str(r#"{"problem_sizes": [3]}"#).unwrap();
        assert_eq!(cfg.problem_sizes, vec![3]);
        assert_eq!(cfg.process_counts, vec![1, 2, 4]);
        assert_eq!(cfg.thread_counts, vec![1, 2, 4]);
    }
}
