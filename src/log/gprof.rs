//! Parsing for a gprof flat-profile dump.
//!
//! Everything before the `Flat profile:` marker is ignored. After it, rows
//! look like:
//!
//!  %   cumulative   self              self     total
//! time   seconds   seconds    calls  ms/call  ms/call  name
//! 62.50      1.25     1.25       81    15.43    15.43  construct_ist
//! 10.00      1.45     96/5136                          gather_results
//!
//! The self-seconds column sometimes carries a `count/total` fraction
//! (recursive call attribution); we compute the quotient. The function name
//! is always the last whitespace-separated token.

use crate::Result;
use anyhow::{Context, bail};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Function name -> self time in seconds.
pub type ProfileRecord = BTreeMap<String, f64>;

/// Parse a gprof dump file. Only called for files that exist.
pub fn parse_gprof(path: &Path) -> Result<ProfileRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read gprof dump {}", path.display()))?;
    Ok(parse_gprof_text(&text))
}

/// Pure text form of [`parse_gprof`], shared with tests.
///
/// Per-row recovery policy: an unparseable self-time token records the
/// function with 0.0 (the dump still names it); a zero-denominator fraction
/// is undefined arithmetic, so the entry is omitted entirely rather than
/// recorded as infinity or a fake zero. Neither aborts the rest of the file.
pub fn parse_gprof_text(text: &str) -> ProfileRecord {
    let mut out = ProfileRecord::new();
    let mut in_flat = false;

    for line in text.lines() {
        if line.contains("Flat profile:") {
            in_flat = true;
            continue;
        }
        if !in_flat || line.trim().is_empty() || line.starts_with('-') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        // Row shape: >=4 columns and a numeric %-time column. Header lines
        // and the trailing legend fail this and are silently skipped.
        if tokens.len() < 4 || !is_numeric_token(tokens[0]) {
            continue;
        }

        let func = tokens[tokens.len() - 1];
        let self_token = tokens[2];

        match parse_self_time(self_token) {
            Ok(v) => {
                out.insert(func.to_string(), v);
            }
            Err(e) if has_zero_denominator(self_token) => {
                eprintln!("WARN: self time for {}: {:#}", func, e);
            }
            Err(e) => {
                eprintln!(
                    "WARN: self time for {}: {:#}; recording 0.0",
                    func, e
                );
                out.insert(func.to_string(), 0.0);
            }
        }
    }

    out
}

/// Parse one self-time token: either plain seconds, or a `count/total`
/// fractional attribution. Dividing by a zero total is an explicit error,
/// never an infinite value.
pub fn parse_self_time(token: &str) -> Result<f64> {
    match token.split_once('/') {
        Some((count, total)) => {
            let count: f64 = count
                .parse()
                .with_context(|| format!("bad fraction count in {:?}", token))?;
            let total: f64 = total
                .parse()
                .with_context(|| format!("bad fraction total in {:?}", token))?;
            if total == 0.0 {
                bail!("zero denominator in fractional self time {:?}", token);
            }
            Ok(count / total)
        }
        None => token
            .parse()
            .with_context(|| format!("bad self time {:?}", token)),
    }
}

/// Digits-and-dots check used to tell profile rows from header text.
fn is_numeric_token(token: &str) -> bool {
    let stripped: String = token.chars().filter(|c| *c != '.').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

fn has_zero_denominator(token: &str) -> bool {
    token
        .split_once('/')
        .is_some_and(|(_, d)| matches!(d.parse::<f64>(), Ok(v) if v == 0.0))
}
