//! Chart rendering: one PNG per chart kind per problem size.
//!
//! This is a mechanical mapping from the finished [`Dataset`] to plotters
//! calls. `Option` values collapse to 0.0 here, at the last moment before a
//! bar needs a plain number.

use crate::Result;
use crate::config::{RunId, SweepConfig};
use crate::model::Dataset;
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 600);
const TITLE_FONT: (&str, u32) = ("sans-serif", 28);
const LABEL_FONT: (&str, u32) = ("sans-serif", 16);
const X_DESC: &str = "Configuration (MPI Processes, OpenMP Threads)";

/// Render every chart the dataset supports. Sizes with no data are skipped
/// without producing an artifact; a failed speedup baseline is a warning,
/// not an error.
pub fn render_charts(data: &Dataset, cfg: &SweepConfig, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;

    for &size in &cfg.problem_sizes {
        total_time_chart(data, size, out_dir)?;
        section_timing_chart(data, size, out_dir)?;
        function_time_chart(data, size, out_dir)?;
        parallel_time_chart(data, size, out_dir)?;
    }

    // Strong scaling at threads=1 for the first configured size (4 in the
    // default sweep). A dataset without that baseline still gets all the
    // other charts.
    if let Some(&size) = cfg.problem_sizes.first() {
        match data.speedup_over_procs(size, 1) {
            Ok(speedups) => speedup_chart(&speedups, size, out_dir)?,
            Err(e) => eprintln!("WARN: skipping speedup chart: {:#}", e),
        }
    }

    Ok(())
}

/// `total_time_n{size}.png`: total wall time per configuration.
fn total_time_chart(data: &Dataset, size: u32, out_dir: &Path) -> Result<()> {
    let runs = data.runs_for_size(size);
    let labels: Vec<String> = runs.iter().map(RunId::label).collect();
    let times: Vec<f64> = runs
        .iter()
        .map(|id| data.total_wall[id].unwrap_or(0.0))
        .collect();

    let path = out_dir.join(format!("total_time_n{}.png", size));
    draw_bar_chart(
        &path,
        &format!("Total Execution Time for n={}", size),
        "Total Execution Time (seconds)",
        &labels,
        &times,
    )
}

/// `parallel_time_n{size}.png`: Total - Graph per configuration.
fn parallel_time_chart(data: &Dataset, size: u32, out_dir: &Path) -> Result<()> {
    let runs: Vec<RunId> = data
        .phases
        .keys()
        .filter(|id| id.size == size)
        .copied()
        .collect();
    let labels: Vec<String> = runs.iter().map(RunId::label).collect();
    let times: Vec<f64> = runs
        .iter()
        .map(|id| data.phases[id].map(|p| p.parallel()).unwrap_or(0.0))
        .collect();

    let path = out_dir.join(format!("parallel_time_n{}.png", size));
    draw_bar_chart(
        &path,
        &format!("Parallel Time (Total - Graph) for n={}", size),
        "Parallel Execution Time (seconds)",
        &labels,
        &times,
    )
}

/// `section_timing_n{size}.png`: stacked breakdown of the six phases.
fn section_timing_chart(data: &Dataset, size: u32, out_dir: &Path) -> Result<()> {
    let runs: Vec<RunId> = data
        .phases
        .keys()
        .filter(|id| id.size == size)
        .copied()
        .collect();
    if runs.is_empty() {
        return Ok(());
    }
    let labels: Vec<String> = runs.iter().map(RunId::label).collect();

    // One series per phase, one value per configuration.
    let mut series: Vec<(String, Vec<f64>)> = ["Graph", "Partition", "LocalVertices", "IST", "Gather", "Output"]
        .iter()
        .map(|n| (n.to_string(), Vec::new()))
        .collect();
    for id in &runs {
        match &data.phases[id] {
            Some(p) => {
                for (i, (_, v)) in p.breakdown().iter().enumerate() {
                    series[i].1.push(*v);
                }
            }
            None => {
                for s in &mut series {
                    s.1.push(0.0);
                }
            }
        }
    }

    let path = out_dir.join(format!("section_timing_n{}.png", size));
    draw_stacked_chart(
        &path,
        &format!("Section Timing Breakdown for n={}", size),
        "Time (seconds)",
        &labels,
        &series,
    )
}

/// `function_time_n{size}.png`: stacked self time of the hottest functions.
///
/// Functions are ranked by their peak self time across the size's
/// configurations and the top five are plotted; ranking by peak keeps the
/// selection deterministic across runs.
fn function_time_chart(data: &Dataset, size: u32, out_dir: &Path) -> Result<()> {
    let runs: Vec<RunId> = data
        .functions
        .keys()
        .filter(|id| id.size == size)
        .copied()
        .collect();
    if runs.is_empty() {
        return Ok(());
    }
    let labels: Vec<String> = runs.iter().map(RunId::label).collect();

    let mut peak: std::collections::BTreeMap<&str, f64> = std::collections::BTreeMap::new();
    for id in &runs {
        for (func, t) in &data.functions[id] {
            let e = peak.entry(func.as_str()).or_insert(0.0);
            if *t > *e {
                *e = *t;
            }
        }
    }
    let mut ranked: Vec<(&str, f64)> = peak.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.truncate(5);

    let series: Vec<(String, Vec<f64>)> = ranked
        .iter()
        .map(|(func, _)| {
            let values = runs
                .iter()
                .map(|id| data.functions[id].get(*func).copied().unwrap_or(0.0))
                .collect();
            (func.to_string(), values)
        })
        .collect();

    let path = out_dir.join(format!("function_time_n{}.png", size));
    draw_stacked_chart(
        &path,
        &format!("Function-Level Time (Top 5 Functions) for n={}", size),
        "Self Time (seconds)",
        &labels,
        &series,
    )
}

/// `speedup_n{size}_threads1.png`: measured strong-scaling speedup over
/// process counts, next to the ideal linear line.
fn speedup_chart(speedups: &[(u32, f64)], size: u32, out_dir: &Path) -> Result<()> {
    if speedups.is_empty() {
        return Ok(());
    }
    let path = out_dir.join(format!("speedup_n{}_threads1.png", size));

    let max_procs = speedups.iter().map(|(p, _)| *p).max().unwrap_or(1) as f64;
    let max_speedup = speedups
        .iter()
        .map(|(_, s)| *s)
        .fold(0.0f64, f64::max)
        .max(max_procs);

    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Strong Scaling Speedup (n={}, threads=1)", size),
            TITLE_FONT,
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_procs * 1.1, 0.0..max_speedup * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Number of MPI Processes")
        .y_desc("Speedup")
        .label_style(LABEL_FONT)
        .draw()?;

    let measured: Vec<(f64, f64)> = speedups.iter().map(|(p, s)| (*p as f64, *s)).collect();
    let blue = Palette99::pick(0).mix(1.0);
    chart
        .draw_series(LineSeries::new(measured.clone(), blue.stroke_width(2)))?
        .label("Speedup")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], blue.stroke_width(2)));
    chart.draw_series(
        measured
            .into_iter()
            .map(|p| Circle::new(p, 4, blue.filled())),
    )?;

    let ideal: Vec<(f64, f64)> = speedups.iter().map(|(p, _)| (*p as f64, *p as f64)).collect();
    let grey = RGBColor(128, 128, 128).mix(1.0);
    chart
        .draw_series(LineSeries::new(ideal, grey.stroke_width(1)))?
        .label("Ideal")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], grey.stroke_width(1)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    root.present()?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Plain bar chart with one bar per configuration label.
fn draw_bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
) -> Result<()> {
    if labels.is_empty() {
        return Ok(());
    }

    let n = labels.len();
    let y_max = values.iter().copied().fold(0.0f64, f64::max).max(1e-9) * 1.2;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| config_label(labels, *x))
        .x_desc(X_DESC)
        .y_desc(y_desc)
        .label_style(LABEL_FONT)
        .draw()?;

    let color = Palette99::pick(0).mix(1.0);
    let bar_width = 0.6;
    for (i, &v) in values.iter().enumerate() {
        let x = i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, v)],
            color.filled(),
        )))?;
    }

    root.present()?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Stacked bar chart: one bar per configuration label, one segment per
/// series, stacked bottom-up in series order.
fn draw_stacked_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    labels: &[String],
    series: &[(String, Vec<f64>)],
) -> Result<()> {
    if labels.is_empty() || series.is_empty() {
        return Ok(());
    }

    let n = labels.len();
    let mut stack_totals = vec![0.0f64; n];
    for (_, values) in series {
        for (i, v) in values.iter().enumerate() {
            stack_totals[i] += v;
        }
    }
    let y_max = stack_totals.iter().copied().fold(0.0f64, f64::max).max(1e-9) * 1.2;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| config_label(labels, *x))
        .x_desc(X_DESC)
        .y_desc(y_desc)
        .label_style(LABEL_FONT)
        .draw()?;

    let bar_width = 0.6;
    let mut bottom = vec![0.0f64; n];
    for (s_idx, (name, values)) in series.iter().enumerate() {
        let color = Palette99::pick(s_idx).mix(1.0);

        let rects: Vec<Rectangle<(f64, f64)>> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new(
                    [
                        (x - bar_width / 2.0, bottom[i]),
                        (x + bar_width / 2.0, bottom[i] + v),
                    ],
                    color.filled(),
                )
            })
            .collect();

        chart
            .draw_series(rects)?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));

        for (i, &v) in values.iter().enumerate() {
            bottom[i] += v;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    root.present()?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Map a fractional x coordinate back to the configuration label under it.
fn config_label(labels: &[String], x: f64) -> String {
    let idx = x.round() as usize;
    if idx < labels.len() && (x - idx as f64).abs() < 0.3 {
        labels[idx].clone()
    } else {
        String::new()
    }
}
