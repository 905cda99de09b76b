//! Transition orchestration: which density files a campaign needs and
//! which of them can be produced right now.
//!
//! A plan takes the cross product (or an explicit list) of requested
//! (left, right) state blocks, puts every pair in bra/ket order, drops
//! the mirror pairs of intra-nuclide sets and classifies what is left as
//! pending, complete or unavailable.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use ksh_core::errors::KshError;
use ksh_core::serde::to_canonical_json_bytes;
use ksh_core::{stable_hash_string, NuclideId, StateLabel};
use ksh_run::{CampaignConfig, RunDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::density::{DensityFileKey, DensityKind};
use crate::pair::order;

/// Options steering pair enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairOptions {
    /// Density or strength-function files.
    #[serde(default)]
    pub kind: DensityKind,
    /// Keep pairs whose bra and ket parities differ.
    #[serde(default = "default_true")]
    pub parity_mix: bool,
    /// Eigenvector pairs `(left, right)` to restrict the density tool to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eigen_pairs: Vec<(u32, u32)>,
}

fn default_true() -> bool {
    true
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            kind: DensityKind::Density,
            parity_mix: true,
            eigen_pairs: Vec::new(),
        }
    }
}

impl PairOptions {
    /// Options for `kind` taken from a campaign file.
    pub fn from_campaign(config: &CampaignConfig, kind: DensityKind) -> Self {
        Self {
            kind,
            parity_mix: config.parity_mix,
            eigen_pairs: config.eigen_pairs.clone(),
        }
    }
}

/// Readiness of one density job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PairStatus {
    /// All inputs exist; the density file has not been written.
    Pending,
    /// The density file already exists.
    Complete,
    /// Some partition or wavefunction files are still missing.
    Unavailable {
        /// Missing inputs.
        missing: Vec<PathBuf>,
    },
}

/// One density file the campaign needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityJob {
    /// Canonical density-file name.
    pub density_file: String,
    /// Bra nucleus.
    pub bra_nuclide: NuclideId,
    /// Bra state block.
    pub bra_state: StateLabel,
    /// Ket nucleus.
    pub ket_nuclide: NuclideId,
    /// Ket state block.
    pub ket_state: StateLabel,
    /// Interaction handed to the density tool (the ket side's).
    pub interaction: PathBuf,
    /// Bra partition file.
    pub bra_partition: String,
    /// Ket partition file.
    pub ket_partition: String,
    /// Bra wavefunction file.
    pub bra_wavefunction: String,
    /// Ket wavefunction file.
    pub ket_wavefunction: String,
    /// Eigenvector pairs in (bra, ket) order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eigen_pairs: Vec<(u32, u32)>,
    /// Readiness.
    pub status: PairStatus,
}

impl DensityJob {
    fn new(key: &DensityFileKey<'_>, eigen_pairs: Vec<(u32, u32)>, status: PairStatus) -> Self {
        Self {
            density_file: key.filename(),
            bra_nuclide: key.bra().nuclide(),
            bra_state: key.bra_state(),
            ket_nuclide: key.ket().nuclide(),
            ket_state: key.ket_state(),
            interaction: key.ket().interaction().path().to_path_buf(),
            bra_partition: key.bra().partition_name(&key.bra_state()),
            ket_partition: key.ket().partition_name(&key.ket_state()),
            bra_wavefunction: key.bra().wavefunction_name(&key.bra_state()),
            ket_wavefunction: key.ket().wavefunction_name(&key.ket_state()),
            eigen_pairs,
            status,
        }
    }

    /// True when the job can be handed to the density tool.
    pub fn is_submittable(&self) -> bool {
        self.status == PairStatus::Pending
    }
}

/// Where a caller-ordered (left, right) pair is stored in a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'p> {
    /// Job holding the transition.
    pub job: &'p DensityJob,
    /// True when the stored job has bra and ket exchanged relative to the
    /// canonical orientation of the request; results must be relabeled.
    pub swapped: bool,
}

/// Density jobs for one (left run, right run) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct PairPlan {
    flipped: bool,
    options: PairOptions,
    jobs: Vec<DensityJob>,
    mirrors: BTreeMap<(StateLabel, StateLabel), (StateLabel, StateLabel)>,
}

impl PairPlan {
    /// True when the right-hand run became the bra.
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Options the plan was built with.
    pub fn options(&self) -> &PairOptions {
        &self.options
    }

    /// Every job, in request order.
    pub fn jobs(&self) -> &[DensityJob] {
        &self.jobs
    }

    /// Jobs ready for submission.
    pub fn submittable(&self) -> impl Iterator<Item = &DensityJob> {
        self.jobs.iter().filter(|job| job.is_submittable())
    }

    /// Jobs whose inputs are still missing.
    pub fn unavailable(&self) -> impl Iterator<Item = &DensityJob> {
        self.jobs
            .iter()
            .filter(|job| matches!(job.status, PairStatus::Unavailable { .. }))
    }

    /// Finds the job covering a caller-ordered (left, right) state pair.
    pub fn resolve(&self, left_state: StateLabel, right_state: StateLabel) -> Option<Resolved<'_>> {
        let (bra, ket) = if self.flipped {
            (right_state, left_state)
        } else {
            (left_state, right_state)
        };
        let find = |bra: StateLabel, ket: StateLabel| {
            self.jobs
                .iter()
                .find(|job| job.bra_state == bra && job.ket_state == ket)
        };
        if let Some(job) = find(bra, ket) {
            return Some(Resolved {
                job,
                swapped: false,
            });
        }
        let (stored_bra, stored_ket) = self.mirrors.get(&(bra, ket))?;
        find(*stored_bra, *stored_ket).map(|job| Resolved { job, swapped: true })
    }
}

/// Default pair list: every left request against every right request.
pub fn cross_product(left: &RunDescriptor, right: &RunDescriptor) -> Vec<(StateLabel, StateLabel)> {
    left.states()
        .iter()
        .flat_map(|l| right.states().iter().map(move |r| (*l, *r)))
        .collect()
}

fn classify(key: &DensityFileKey<'_>, dir: &Path) -> PairStatus {
    let missing = key.missing_inputs(dir);
    if !missing.is_empty() {
        PairStatus::Unavailable { missing }
    } else if key.path(dir).exists() {
        PairStatus::Complete
    } else {
        PairStatus::Pending
    }
}

/// Builds the density plan between two runs.
///
/// `pairs` are caller-ordered (left state, right state) blocks and default
/// to [`cross_product`]. Availability is checked against `dir`.
pub fn enumerate_pairs(
    left: &RunDescriptor,
    right: &RunDescriptor,
    pairs: Option<&[(StateLabel, StateLabel)]>,
    options: &PairOptions,
    dir: &Path,
) -> PairPlan {
    let requested = match pairs {
        Some(pairs) => pairs.to_vec(),
        None => cross_product(left, right),
    };
    let ordered = order(left, right);
    let intra = ordered.is_intra_nuclide();
    let oriented: Vec<(StateLabel, StateLabel)> = requested
        .iter()
        .map(|(l, r)| ordered.orient(*l, *r))
        .collect();
    let eigen_pairs: Vec<(u32, u32)> = options
        .eigen_pairs
        .iter()
        .map(|(l, r)| ordered.orient(*l, *r))
        .collect();

    let mut seen = BTreeSet::new();
    let mut mirrors = BTreeMap::new();
    let mut jobs = Vec::new();
    for (bra_state, ket_state) in oriented {
        if !seen.insert((bra_state, ket_state)) {
            continue;
        }
        if intra && bra_state != ket_state && seen.contains(&(ket_state, bra_state)) {
            debug!(bra = %bra_state, ket = %ket_state, "mirror pair already planned");
            mirrors.insert((bra_state, ket_state), (ket_state, bra_state));
            continue;
        }
        if !options.parity_mix && bra_state.parity != ket_state.parity {
            debug!(bra = %bra_state, ket = %ket_state, "parity-changing pair skipped");
            continue;
        }
        let key = DensityFileKey::new(
            ordered.bra,
            bra_state,
            ordered.ket,
            ket_state,
            options.kind,
        );
        let status = classify(&key, dir);
        if let PairStatus::Unavailable { missing } = &status {
            warn!(
                density = %key.filename(),
                missing = missing.len(),
                "inputs not ready, pair left out of the batch"
            );
        }
        jobs.push(DensityJob::new(&key, eigen_pairs.clone(), status));
    }
    info!(
        bra = %ordered.bra.stem(),
        ket = %ordered.ket.stem(),
        jobs = jobs.len(),
        mirrors = mirrors.len(),
        "density plan built"
    );
    PairPlan {
        flipped: ordered.flipped,
        options: options.clone(),
        jobs,
        mirrors,
    }
}

#[derive(Serialize)]
struct PlanFingerprint<'a> {
    bra: String,
    ket: String,
    options: &'a PairOptions,
    density_files: Vec<&'a str>,
}

/// Serializable record of a plan, fingerprinted by its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignManifest {
    /// Bra-side run.
    pub bra: RunDescriptor,
    /// Ket-side run.
    pub ket: RunDescriptor,
    /// Whether the caller's order was swapped.
    pub flipped: bool,
    /// Options used for enumeration.
    pub options: PairOptions,
    /// Planned jobs with their current status.
    pub jobs: Vec<DensityJob>,
    /// SHA-256 over runs, options and density-file names; independent of
    /// job status, so a resumed campaign keeps its hash.
    pub plan_hash: String,
}

impl CampaignManifest {
    /// Records `plan`, built from `left` and `right`.
    pub fn new(
        left: &RunDescriptor,
        right: &RunDescriptor,
        plan: &PairPlan,
    ) -> Result<Self, KshError> {
        let ordered = order(left, right);
        let fingerprint = PlanFingerprint {
            bra: ordered.bra.stem(),
            ket: ordered.ket.stem(),
            options: &plan.options,
            density_files: plan.jobs.iter().map(|job| job.density_file.as_str()).collect(),
        };
        Ok(Self {
            bra: ordered.bra.clone(),
            ket: ordered.ket.clone(),
            flipped: plan.flipped,
            options: plan.options.clone(),
            jobs: plan.jobs.clone(),
            plan_hash: stable_hash_string(&fingerprint)?,
        })
    }

    /// Number of jobs per status: (pending, complete, unavailable).
    pub fn counts(&self) -> (usize, usize, usize) {
        self.jobs
            .iter()
            .fold((0, 0, 0), |(pending, complete, unavailable), job| match job.status {
                PairStatus::Pending => (pending + 1, complete, unavailable),
                PairStatus::Complete => (pending, complete + 1, unavailable),
                PairStatus::Unavailable { .. } => (pending, complete, unavailable + 1),
            })
    }

    /// Writes the manifest as canonical JSON.
    pub fn write(&self, path: &Path) -> Result<(), KshError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| KshError::io("manifest_write", path.display(), err))
    }
}
