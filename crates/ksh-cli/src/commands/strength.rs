use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ksh_run::{load_config, RunDescriptor, ZeroBodyOffset};
use ksh_transit::{
    aggregate_espe, enumerate_pairs, espe_neighbours, strength_from_plan, DensityKind, EspeMode,
    PairOptions,
};
use serde::Serialize;
use tracing::{info, warn};

use super::emit_json;

#[derive(Args, Debug)]
pub struct StrengthArgs {
    /// YAML campaign file.
    #[arg(long)]
    pub config: PathBuf,
    /// Run whose single-particle energies are wanted.
    #[arg(long)]
    pub target: String,
    /// `hole`, `particle` or `both`.
    #[arg(long, default_value = "hole")]
    pub mode: EspeMode,
    /// Ignore transitions involving higher eigenvector ordinals.
    #[arg(long)]
    pub max_states: Option<u32>,
    /// Optional JSON output path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct OrbitRow {
    n: u32,
    l: u32,
    j2: u32,
    pn: i32,
    sum_sf: f64,
    centroid: f64,
}

pub fn run(args: &StrengthArgs) -> Result<(), Box<dyn Error>> {
    let campaign = load_config(&args.config)?;
    let target_spec = campaign.run(&args.target)?;
    let target = RunDescriptor::from_spec(target_spec)?;
    let wanted = espe_neighbours(target.nuclide(), args.mode)?;
    let options = PairOptions::from_campaign(&campaign, DensityKind::StrengthFunction);

    let mut reports = Vec::new();
    for nuclide in &wanted {
        let Some((name, spec)) = campaign
            .runs
            .iter()
            .find(|(_, spec)| spec.nuclide == *nuclide)
        else {
            warn!(nuclide = %nuclide, "no run configured for neighbour");
            continue;
        };
        let neighbour = RunDescriptor::from_spec(spec)?;
        let plan = enumerate_pairs(&target, &neighbour, None, &options, &campaign.workdir);
        let report = strength_from_plan(
            &plan,
            &campaign.workdir,
            &ZeroBodyOffset(target_spec.zero_body),
            &ZeroBodyOffset(spec.zero_body),
            args.max_states,
        )?;
        info!(neighbour = %name, orbits = report.orbits.len(), "neighbour strength collected");
        reports.push(report);
    }

    let total = aggregate_espe(&reports);
    let rows: Vec<OrbitRow> = total
        .orbits
        .iter()
        .map(|(orbit, strength)| OrbitRow {
            n: orbit.n,
            l: orbit.l,
            j2: orbit.j2,
            pn: orbit.pn,
            sum_sf: strength.sum_sf,
            centroid: strength.centroid,
        })
        .collect();
    emit_json(&rows, args.out.as_deref())
}
