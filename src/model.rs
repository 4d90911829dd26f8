//! Aggregation model: fold per-run parse results over the sweep grid.

use crate::Result;
use crate::config::{RunId, SweepConfig};
use crate::log::{self, PhaseTimes, ProfileRecord};
use anyhow::bail;
use std::collections::BTreeMap;
use std::path::Path;

/// Everything the charts need, keyed flat by run id.
///
/// A key is present only when the corresponding file existed on disk; a run
/// can have wall/phase data without profile data and vice versa. Inner
/// `Option`s mean "file present, pattern absent". Built once, then read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub total_wall: BTreeMap<RunId, Option<f64>>,
    pub phases: BTreeMap<RunId, Option<PhaseTimes>>,
    pub functions: BTreeMap<RunId, ProfileRecord>,
}

/// Single forward pass over the sweep grid. Missing or unreadable files
/// warn and leave their keys absent; nothing here aborts the sweep.
pub fn build_dataset(log_dir: &Path, cfg: &SweepConfig) -> Dataset {
    let mut data = Dataset::default();

    for id in cfg.grid() {
        let run_path = id.run_log_path(log_dir);
        if run_path.exists() {
            match log::parse_run_log(&run_path) {
                Ok(rec) => {
                    data.total_wall.insert(id, rec.total_wall);
                    data.phases.insert(id, rec.phases);
                }
                Err(e) => eprintln!("WARN: skipping {}: {:#}", run_path.display(), e),
            }
        } else {
            eprintln!("WARN: run log not found: {}", run_path.display());
        }

        // The profiler dump is independent of the run log; one can be
        // present without the other.
        let gprof_path = id.gprof_path(log_dir);
        if gprof_path.exists() {
            match log::parse_gprof(&gprof_path) {
                Ok(rec) => {
                    data.functions.insert(id, rec);
                }
                Err(e) => eprintln!("WARN: skipping {}: {:#}", gprof_path.display(), e),
            }
        } else {
            eprintln!("WARN: gprof dump not found: {}", gprof_path.display());
        }
    }

    data
}

impl Dataset {
    /// Run ids with any wall/phase data for one problem size, in grid order.
    pub fn runs_for_size(&self, size: u32) -> Vec<RunId> {
        self.total_wall
            .keys()
            .filter(|id| id.size == size)
            .copied()
            .collect()
    }

    /// Strong-scaling speedups over process counts at a fixed size and
    /// thread count: baseline-time / cell-time for every measured cell.
    ///
    /// The baseline is the `np=1` cell. If it is absent or measured 0.0 the
    /// whole query fails, rather than dividing by a missing key as the
    /// original did.
    pub fn speedup_over_procs(&self, size: u32, threads: u32) -> Result<Vec<(u32, f64)>> {
        let baseline_id = RunId::new(size, 1, threads);
        let baseline = match self.total_wall.get(&baseline_id) {
            Some(Some(t)) if *t > 0.0 => *t,
            Some(_) => bail!(
                "speedup baseline n={} np=1 threads={} has no usable total time",
                size,
                threads
            ),
            None => bail!(
                "speedup baseline n={} np=1 threads={} was not measured",
                size,
                threads
            ),
        };

        let mut out = Vec::new();
        for (id, total) in &self.total_wall {
            if id.size != size || id.threads != threads {
                continue;
            }
            match total {
                Some(t) if *t > 0.0 => out.push((id.procs, baseline / t)),
                _ => eprintln!(
                    "WARN: no usable total time for {}; dropped from speedup",
                    id.label()
                ),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const RUN_LOG: &str = "\
IST construction finished.
Timing: Graph=0.10s, Partition=0.05s, LocalVertices=0.02s, IST=1.50s, Gather=0.20s, Output=0.08s, Total=1.95s
Elapsed (wall clock) time (h:mm:ss or m:ss): 0:02.10
";

    const GPROF: &str = "\
Flat profile:
 62.50 1.25 0.75 81 15.43 15.43 construct_ist
 10.00 1.45 96/5136 12 1.00 1.00 gather_results
";

    fn tiny_sweep() -> SweepConfig {
        SweepConfig {
            problem_sizes: vec![4],
            process_counts: vec![1, 2],
            thread_counts: vec![1],
        }
    }

    #[test]
    fn absent_files_leave_keys_absent_in_all_maps() {
        let dir = tempfile::tempdir().unwrap();
        let data = build_dataset(dir.path(), &tiny_sweep());
        assert!(data.total_wall.is_empty());
        assert!(data.phases.is_empty());
        assert!(data.functions.is_empty());
    }

    #[test]
    fn run_log_and_gprof_are_ingested_independently() {
        let dir = tempfile::tempdir().unwrap();
        let id_run = RunId::new(4, 1, 1);
        let id_prof = RunId::new(4, 2, 1);
        fs::write(id_run.run_log_path(dir.path()), RUN_LOG).unwrap();
        fs::write(id_prof.gprof_path(dir.path()), GPROF).unwrap();

        let data = build_dataset(dir.path(), &tiny_sweep());

        assert_eq!(data.total_wall.get(&id_run), Some(&Some(2.1)));
        assert!(data.phases[&id_run].is_some());
        assert!(!data.functions.contains_key(&id_run));

        assert!(!data.total_wall.contains_key(&id_prof));
        assert_eq!(data.functions[&id_prof]["construct_ist"], 0.75);
        assert_eq!(data.functions[&id_prof]["gather_results"], 96.0 / 5136.0);
    }

    #[test]
    fn phase_values_match_the_log_literals() {
        let dir = tempfile::tempdir().unwrap();
        let id = RunId::new(4, 1, 1);
        fs::write(id.run_log_path(dir.path()), RUN_LOG).unwrap();

        let data = build_dataset(dir.path(), &tiny_sweep());
        let phases = data.phases[&id].unwrap();
        assert_eq!(phases.graph, 0.10);
        assert_eq!(phases.ist, 1.50);
        assert_eq!(phases.total, 1.95);
        assert_eq!(phases.parallel(), 1.95 - 0.10);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let id = RunId::new(4, 1, 1);
        fs::write(id.run_log_path(dir.path()), RUN_LOG).unwrap();
        fs::write(id.gprof_path(dir.path()), GPROF).unwrap();

        let cfg = tiny_sweep();
        assert_eq!(build_dataset(dir.path(), &cfg), build_dataset(dir.path(), &cfg));
    }

    #[test]
    fn speedup_is_ratio_to_np1_baseline() {
        let mut data = Dataset::default();
        data.total_wall.insert(RunId::new(4, 1, 1), Some(100.0));
        data.total_wall.insert(RunId::new(4, 2, 1), Some(50.0));
        data.total_wall.insert(RunId::new(4, 4, 1), Some(25.0));
        // Different threads must not leak into the query.
        data.total_wall.insert(RunId::new(4, 2, 2), Some(10.0));

        let speedups = data.speedup_over_procs(4, 1).unwrap();
        assert_eq!(speedups, vec![(1, 1.0), (2, 2.0), (4, 4.0)]);
    }

    #[test]
    fn speedup_fails_fast_without_a_baseline() {
        let mut data = Dataset::default();
        data.total_wall.insert(RunId::new(4, 2, 1), Some(50.0));
        assert!(data.speedup_over_procs(4, 1).is_err());

        // Baseline present but measured 0.0 is just as unusable.
        data.total_wall.insert(RunId::new(4, 1, 1), Some(0.0));
        assert!(data.speedup_over_procs(4, 1).is_err());

        // Pattern-absent baseline too.
        data.total_wall.insert(RunId::new(4, 1, 1), None);
        assert!(data.speedup_over_procs(4, 1).is_err());
    }

    #[test]
    fn runs_for_size_filters_and_orders() {
        let mut data = Dataset::default();
        data.total_wall.insert(RunId::new(5, 1, 1), Some(1.0));
        data.total_wall.insert(RunId::new(4, 2, 1), Some(1.0));
        data.total_wall.insert(RunId::new(4, 1, 2), Some(1.0));
        assert_eq!(
            data.runs_for_size(4),
            vec![RunId::new(4, 1, 2), RunId::new(4, 2, 1)]
        );
    }
}
