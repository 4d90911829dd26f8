use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod log;
mod model;
mod render;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "scaling-viz")]
#[command(about = "Scaling charts from MPI/OpenMP benchmark sweep logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the sweep's run logs + gprof dumps and render the charts.
    Charts {
        /// Directory holding run_n*_np*_threads*.log and gprof_n*_np*_threads*.txt.
        #[arg(long)]
        log_dir: PathBuf,

        /// Directory receiving the PNG charts (created if absent).
        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Optional JSON file overriding the swept dimension values.
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Charts {
            log_dir,
            out,
            config,
        } => {
            // 1) Which (n, np, threads) points to look for.
            let cfg = match &config {
                Some(path) => config::SweepConfig::from_json_file(path)?,
                None => config::SweepConfig::default(),
            };

            // 2) Parse + aggregate. Missing runs warn and are left out; the
            //    dataset is whatever the log directory actually supports.
            let data = model::build_dataset(&log_dir, &cfg);

            // 3) Render.
            render::render_charts(&data, &cfg, &out)?;
        }
    }

    Ok(())
}
