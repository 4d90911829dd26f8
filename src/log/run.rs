//! Parsing for one benchmark run log.
//!
//! A run log is free text: the benchmark's stdout, followed by the
//! `/usr/bin/time -v` summary. Two patterns matter, and both are searched
//! independently over the whole file:
//!
//! Elapsed (wall clock) time (h:mm:ss or m:ss): 2:03.50
//! Timing: Graph=0.12s, Partition=0.04s, LocalVertices=0.01s, IST=1.80s, Gather=0.22s, Output=0.09s, Total=2.28s

use crate::Result;
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Per-phase wall times from the driver's single `Timing:` summary line.
///
/// The seven fields come from one atomic regex match: either all are
/// populated from the same line, or the record carries no phase data at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimes {
    pub graph: f64,
    pub partition: f64,
    pub local_vertices: f64,
    pub ist: f64,
    pub gather: f64,
    pub output: f64,
    pub total: f64,
}

impl PhaseTimes {
    /// The six non-Total phases in report order, for stacked charts.
    pub fn breakdown(&self) -> [(&'static str, f64); 6] {
        [
            ("Graph", self.graph),
            ("Partition", self.partition),
            ("LocalVertices", self.local_vertices),
            ("IST", self.ist),
            ("Gather", self.gather),
            ("Output", self.output),
        ]
    }

    /// Time spent outside serial graph construction: Total - Graph.
    pub fn parallel(&self) -> f64 {
        self.total - self.graph
    }
}

/// Result of parsing one run log.
///
/// `None` means the pattern was absent from the file ("not measured"),
/// which is distinct from a measured 0.0. Consumers that need a plain
/// number collapse to 0.0 at the last moment.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub total_wall: Option<f64>,
    pub phases: Option<PhaseTimes>,
}

/// Parse a run log file. Only called for files that exist; absence of either
/// pattern inside the file is a warning, not an error.
pub fn parse_run_log(path: &Path) -> Result<RunRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read run log {}", path.display()))?;

    let record = parse_run_text(&text)?;
    if record.total_wall.is_none() {
        eprintln!("WARN: no wall clock time in {}", path.display());
    }
    if record.phases.is_none() {
        eprintln!("WARN: no phase timing line in {}", path.display());
    }
    Ok(record)
}

/// Pure text form of [`parse_run_log`], shared with tests.
pub fn parse_run_text(text: &str) -> Result<RunRecord> {
    Ok(RunRecord {
        total_wall: extract_wall_clock(text)?,
        phases: extract_phases(text)?,
    })
}

/// `/usr/bin/time -v` elapsed line, minutes:seconds -> seconds.
fn extract_wall_clock(text: &str) -> Result<Option<f64>> {
    let re = Regex::new(
        r"Elapsed \(wall clock\) time \(h:mm:ss or m:ss\): (\d+):(\d+\.\d+)",
    )?;
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };

    // The digit-constrained groups can only fail to parse on overflow-ish
    // garbage; treat that as pattern-absent rather than aborting the file.
    let minutes: f64 = match caps[1].parse() {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    let seconds: f64 = match caps[2].parse() {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    Ok(Some(minutes * 60.0 + seconds))
}

/// Driver `Timing:` summary line. One match populates all seven phases;
/// a failed numeric conversion in any group voids the whole match.
fn extract_phases(text: &str) -> Result<Option<PhaseTimes>> {
    let re = Regex::new(
        r"Timing: Graph=([\d.]+)s, Partition=([\d.]+)s, LocalVertices=([\d.]+)s, IST=([\d.]+)s, Gather=([\d.]+)s, Output=([\d.]+)s, Total=([\d.]+)s",
    )?;
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };

    let mut vals = [0.0f64; 7];
    for (i, val) in vals.iter_mut().enumerate() {
        match caps[i + 1].parse() {
            Ok(v) => *val = v,
            // e.g. "1.2.3" slips through [\d.]+ but is not a number.
            Err(_) => return Ok(None),
        }
    }

    Ok(Some(PhaseTimes {
        graph: vals[0],
        partition: vals[1],
        local_vertices: vals[2],
        ist: vals[3],
        gather: vals[4],
        output: vals[5],
        total: vals[6],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TIMING_LINE: &str = "Timing: Graph=0.12s, Partition=0.04s, LocalVertices=0.01s, \
                               IST=1.80s, Gather=0.22s, Output=0.09s, Total=2.28s";

    #[test]
    fn wall_clock_converts_minutes_to_seconds() {
        let text = "Command being timed: ...\n\
                    Elapsed (wall clock) time (h:mm:ss or m:ss): 2:03.50\n\
                    Maximum resident set size (kbytes): 12345\n";
        let rec = parse_run_text(text).unwrap();
        assert_eq!(rec.total_wall, Some(123.5));
    }

    #[test]
    fn phase_line_populates_all_seven_fields_atomically() {
        let text = format!("noise before\n{}\nnoise after\n", TIMING_LINE);
        let rec = parse_run_text(&text).unwrap();
        assert_eq!(
            rec.phases,
            Some(PhaseTimes {
                graph: 0.12,
                partition: 0.04,
                local_vertices: 0.01,
                ist: 1.80,
                gather: 0.22,
                output: 0.09,
                total: 2.28,
            })
        );
    }

    #[test]
    fn both_patterns_extracted_independently() {
        let wall_only = "Elapsed (wall clock) time (h:mm:ss or m:ss): 0:10.00\n";
        let rec = parse_run_text(wall_only).unwrap();
        assert_eq!(rec.total_wall, Some(10.0));
        assert_eq!(rec.phases, None);

        let phases_only = format!("{}\n", TIMING_LINE);
        let rec = parse_run_text(&phases_only).unwrap();
        assert_eq!(rec.total_wall, None);
        assert!(rec.phases.is_some());
    }

    #[test]
    fn empty_or_noisy_text_yields_absent_fields() {
        let rec = parse_run_text("").unwrap();
        assert_eq!(
            rec,
            RunRecord {
                total_wall: None,
                phases: None,
            }
        );

        let rec = parse_run_text("Timing: Graph=oops\nElapsed time: 5\n").unwrap();
        assert_eq!(rec.total_wall, None);
        assert_eq!(rec.phases, None);
    }

    #[test]
    fn malformed_number_inside_phase_match_voids_whole_pattern() {
        // "1.2.3" satisfies [\d.]+ but is not a float; no partial extraction.
        let text = "Timing: Graph=1.2.3s, Partition=0.04s, LocalVertices=0.01s, \
                    IST=1.80s, Gather=0.22s, Output=0.09s, Total=2.28s";
        let rec = parse_run_text(text).unwrap();
        assert_eq!(rec.phases, None);
    }

    #[test]
    fn breakdown_order_is_fixed() {
        let p = PhaseTimes {
            graph: 1.0,
            partition: 2.0,
            local_vertices: 3.0,
            ist: 4.0,
            gather: 5.0,
            output: 6.0,
            total: 21.0,
        };
        let names: Vec<&str> = p.breakdown().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec!["Graph", "Partition", "LocalVertices", "IST", "Gather", "Output"]
        );
        assert_eq!(p.parallel(), 20.0);
    }
}
