use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{emit_json, RunSelection};

#[derive(Args, Debug)]
pub struct NamesArgs {
    #[command(flatten)]
    pub selection: RunSelection,
    /// Optional JSON output path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StateNames {
    code: String,
    partition: String,
    wavefunction: String,
    log: String,
}

#[derive(Debug, Serialize)]
struct RunNames {
    stem: String,
    script: String,
    summary: String,
    mixed_parity: bool,
    run_args: Vec<(String, String)>,
    states: BTreeMap<String, StateNames>,
}

pub fn run(args: &NamesArgs) -> Result<(), Box<dyn Error>> {
    let selected = args.selection.load()?;
    let run = &selected.descriptor;
    let states = run
        .states()
        .iter()
        .map(|state| {
            (
                state.to_string(),
                StateNames {
                    code: run.file_code(state),
                    partition: run.partition_name(state),
                    wavefunction: run.wavefunction_name(state),
                    log: run.log_name(state),
                },
            )
        })
        .collect();
    let names = RunNames {
        stem: run.stem(),
        script: run.script_name(),
        summary: run.summary_name(),
        mixed_parity: run.mixes_parity(),
        run_args: run.run_args().pairs(),
        states,
    };
    emit_json(&names, args.out.as_deref())
}
