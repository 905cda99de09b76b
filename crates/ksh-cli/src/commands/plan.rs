use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ksh_run::{load_config, RunDescriptor};
use ksh_transit::{enumerate_pairs, CampaignManifest, DensityKind, PairOptions};
use tracing::info;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// YAML campaign file.
    #[arg(long)]
    pub config: PathBuf,
    /// Run on the left of the transition.
    #[arg(long)]
    pub left: String,
    /// Run on the right of the transition.
    #[arg(long)]
    pub right: String,
    /// `density` or `strength-function`.
    #[arg(long, default_value = "density")]
    pub kind: DensityKind,
    /// Manifest output path.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let campaign = load_config(&args.config)?;
    let left = RunDescriptor::from_spec(campaign.run(&args.left)?)?;
    let right = RunDescriptor::from_spec(campaign.run(&args.right)?)?;
    let options = PairOptions::from_campaign(&campaign, args.kind);
    let plan = enumerate_pairs(&left, &right, None, &options, &campaign.workdir);
    let manifest = CampaignManifest::new(&left, &right, &plan)?;
    manifest.write(&args.out)?;
    let (pending, complete, unavailable) = manifest.counts();
    info!(
        plan_hash = %manifest.plan_hash,
        pending,
        complete,
        unavailable,
        "manifest written"
    );
    for job in plan.submittable() {
        println!("{}", job.density_file);
    }
    Ok(())
}
