use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ksh_run::{read_logs, StateOccupation, ZeroBodyOffset};
use serde::Serialize;

use super::{emit_json, RunSelection};

#[derive(Args, Debug)]
pub struct OccupationsArgs {
    #[command(flatten)]
    pub selection: RunSelection,
    /// Optional JSON output path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct OccupationRow {
    #[serde(flatten)]
    record: StateOccupation,
    proton_total: f64,
    neutron_total: f64,
}

pub fn run(args: &OccupationsArgs) -> Result<(), Box<dyn Error>> {
    let selected = args.selection.load()?;
    let paths: Vec<PathBuf> = selected
        .descriptor
        .log_files()
        .into_iter()
        .map(|name| selected.campaign.workdir.join(name))
        .collect();
    let refs: Vec<&std::path::Path> = paths.iter().map(PathBuf::as_path).collect();
    let records = read_logs(&refs, &ZeroBodyOffset(selected.spec.zero_body))?;
    let rows: Vec<OccupationRow> = records
        .into_iter()
        .map(|record| OccupationRow {
            proton_total: record.proton_total(),
            neutron_total: record.neutron_total(),
            record,
        })
        .collect();
    emit_json(&rows, args.out.as_deref())
}
