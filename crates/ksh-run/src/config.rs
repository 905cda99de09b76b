//! YAML-configurable run arguments and campaign files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::serde::{from_yaml_slice, to_yaml_string};
use ksh_core::{NuclideId, TruncationSpec};
use serde::{Deserialize, Serialize};

/// Solver run-argument overrides.
///
/// Defaults are materialized per value through [`Default`]; nothing is
/// shared between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArgs {
    /// Centre-of-mass Lawson coefficient; non-zero values enter file names.
    #[serde(default)]
    pub beta_cm: i64,
    /// Lanczos vector storage mode.
    #[serde(default)]
    pub mode_lv_hdd: i64,
    /// Any further `key = value` overrides, forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            beta_cm: 0,
            mode_lv_hdd: 0,
            extra: BTreeMap::new(),
        }
    }
}

impl RunArgs {
    /// Ordered `(key, value)` pairs as handed to the solver.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("beta_cm".to_string(), self.beta_cm.to_string()),
            ("mode_lv_hdd".to_string(), self.mode_lv_hdd.to_string()),
        ];
        out.extend(
            self.extra
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        out
    }

    /// File-name fragment contributed by the arguments.
    pub fn fragment(&self) -> String {
        if self.beta_cm != 0 {
            format!("_betacm{}", self.beta_cm)
        } else {
            String::new()
        }
    }
}

/// One solver run as written in a campaign file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Target nucleus, e.g. `O18`.
    pub nuclide: NuclideId,
    /// Interaction file; only its stem enters derived names.
    pub interaction: PathBuf,
    /// Comma separated state requests, e.g. `"0+3,2+2"` or `"+10"`.
    pub states: String,
    /// Optional configuration-space truncation.
    #[serde(default)]
    pub truncation: TruncationSpec,
    /// Run-argument overrides.
    #[serde(default)]
    pub run_args: RunArgs,
    /// Zero-body energy of the interaction, added to solver energies.
    #[serde(default)]
    pub zero_body: f64,
}

/// Campaign file: a working directory plus named runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Directory holding solver artefacts.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Runs keyed by a caller chosen name.
    #[serde(default)]
    pub runs: BTreeMap<String, RunSpec>,
    /// Keep bra/ket pairs whose parities differ.
    #[serde(default = "default_parity_mix")]
    pub parity_mix: bool,
    /// Eigenvector pairs `(left, right)` handed to the density tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eigen_pairs: Vec<(u32, u32)>,
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_parity_mix() -> bool {
    true
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            runs: BTreeMap::new(),
            parity_mix: default_parity_mix(),
            eigen_pairs: Vec::new(),
        }
    }
}

impl CampaignConfig {
    /// Looks up a run by name.
    pub fn run(&self, name: &str) -> Result<&RunSpec, KshError> {
        self.runs.get(name).ok_or_else(|| {
            KshError::Serde(
                ErrorInfo::new("unknown-run", "run not declared in the campaign file")
                    .with_context("run", name)
                    .with_hint(format!(
                        "declared runs: {}",
                        self.runs.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            )
        })
    }

    /// Serializes the campaign back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, KshError> {
        to_yaml_string(self)
    }
}

/// Loads a campaign file from disk.
pub fn load_config(path: &Path) -> Result<CampaignConfig, KshError> {
    let bytes = fs::read(path).map_err(|err| KshError::io("config_read", path.display(), err))?;
    from_yaml_slice(&bytes)
}
