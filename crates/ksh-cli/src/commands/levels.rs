use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ksh_core::StateLabel;
use ksh_run::{read_wavefunction_index, ZeroBodyOffset};
use serde::Serialize;
use tracing::info;

use super::{emit_json, RunSelection};

#[derive(Args, Debug)]
pub struct LevelsArgs {
    #[command(flatten)]
    pub selection: RunSelection,
    /// Optional JSON output path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Level {
    state: StateLabel,
    energy: f64,
    excitation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wavefunction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
}

pub fn run(args: &LevelsArgs) -> Result<(), Box<dyn Error>> {
    let selected = args.selection.load()?;
    let workdir = &selected.campaign.workdir;
    let table = selected
        .descriptor
        .load_energies(workdir, &ZeroBodyOffset(selected.spec.zero_body))?;
    let index = read_wavefunction_index(&workdir.join(selected.descriptor.summary_name()))?;
    let lowest = table.lowest().map_or(0.0, |(_, energy)| energy);
    let levels: Vec<Level> = table
        .levels()
        .into_iter()
        .map(|(state, energy)| {
            let entry = index.get(&state);
            Level {
                state,
                energy,
                excitation: energy - lowest,
                wavefunction: entry.map(|entry| entry.wavefunction_name()),
                position: entry.map(|entry| entry.position),
            }
        })
        .collect();
    info!(run = %selected.descriptor.stem(), levels = levels.len(), "summary parsed");
    emit_json(&levels, args.out.as_deref())
}
