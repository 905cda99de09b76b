use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use ksh_core::serde::to_canonical_json_bytes;
use ksh_run::{load_config, CampaignConfig, RunDescriptor, RunSpec};
use serde::Serialize;

pub mod closure;
pub mod levels;
pub mod names;
pub mod occupations;
pub mod plan;
pub mod strength;

/// Campaign file plus one run selected from it.
#[derive(Args, Debug)]
pub struct RunSelection {
    /// YAML campaign file.
    #[arg(long)]
    pub config: PathBuf,
    /// Name of the run inside the campaign file.
    #[arg(long)]
    pub run: String,
}

pub struct SelectedRun {
    pub campaign: CampaignConfig,
    pub spec: RunSpec,
    pub descriptor: RunDescriptor,
}

impl RunSelection {
    pub fn load(&self) -> Result<SelectedRun, Box<dyn Error>> {
        let campaign = load_config(&self.config)?;
        let spec = campaign.run(&self.run)?.clone();
        let descriptor = RunDescriptor::from_spec(&spec)?;
        Ok(SelectedRun {
            campaign,
            spec,
            descriptor,
        })
    }
}

/// Writes canonical JSON to `out`, or stdout when absent.
pub fn emit_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let bytes = to_canonical_json_bytes(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, bytes)?;
        }
        None => println!("{}", String::from_utf8(bytes)?),
    }
    Ok(())
}
