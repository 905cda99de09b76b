use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use ksh_transit::{closure_sum, load_closure_config, ClosureInput, TabulatedDensity};
use serde::Serialize;

use super::emit_json;

#[derive(Args, Debug)]
pub struct ClosureArgs {
    /// YAML closure description.
    #[arg(long)]
    pub config: PathBuf,
    /// CSV file receiving one row per intermediate state.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct ClosureSummary {
    ground_energy: f64,
    blocks: Vec<ksh_transit::BlockSum>,
    total: f64,
}

pub fn run(args: &ClosureArgs) -> Result<(), Box<dyn Error>> {
    let config = load_closure_config(&args.config)?;
    let base = args.config.parent().unwrap_or_else(|| Path::new("."));
    let runs = config.runs()?;
    let energies = runs
        .intermediate
        .load_energies_with_offset(&config.workdir_path(base), config.zero_body)?;
    let densities = TabulatedDensity::load(&config.densities_path(base))?;
    let report = closure_sum(
        &ClosureInput {
            final_run: &runs.final_run,
            final_state: config.final_state,
            initial_run: &runs.initial,
            initial_state: config.initial,
            intermediate_run: &runs.intermediate,
            intermediate_energies: &energies,
            ground_energy: config.ground_energy,
            operator: &config.operator,
            q_value: config.q_value,
        },
        &densities,
    )?;

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = csv::Writer::from_path(&args.out)?;
    file.write_record(["j", "parity", "index", "left", "right", "denominator", "running"])?;
    for row in &report.rows {
        let j = row.state.j.map(|spin| spin.decimal()).unwrap_or_default();
        file.write_record([
            j,
            row.state.parity.to_string(),
            row.state.index.to_string(),
            format!("{:.8}", row.left),
            format!("{:.8}", row.right),
            format!("{:.8}", row.denominator),
            format!("{:.8}", row.running),
        ])?;
    }
    file.flush()?;

    emit_json(
        &ClosureSummary {
            ground_energy: report.ground_energy,
            blocks: report.blocks,
            total: report.total,
        },
        None,
    )
}
