//! Run descriptors and every file name derived from them.
//!
//! All names are pure functions of the descriptor's fields. Script,
//! summary, partition, wavefunction and log names share one stem:
//! `{nuclide}_{interaction}[_betacm{b}][_hw{n}][_ph{windows}]`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::{join_state_list, parse_state_list, NuclideId, Parity, StateLabel, TruncationSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RunArgs, RunSpec};
use crate::interaction::{Interaction, InteractionService, ZeroBodyOffset};
use crate::summary::{read_summary, EnergyTable};

/// One solver configuration: nucleus, interaction, requested states,
/// truncation and run arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDescriptor {
    nuclide: NuclideId,
    interaction: Interaction,
    states: Vec<StateLabel>,
    #[serde(default)]
    truncation: TruncationSpec,
    #[serde(default)]
    run_args: RunArgs,
}

impl RunDescriptor {
    /// Creates a descriptor with default run arguments.
    pub fn new(
        nuclide: NuclideId,
        interaction: Interaction,
        states: Vec<StateLabel>,
        truncation: TruncationSpec,
    ) -> Self {
        Self {
            nuclide,
            interaction,
            states,
            truncation,
            run_args: RunArgs::default(),
        }
    }

    /// Convenience constructor from the textual forms, e.g.
    /// `RunDescriptor::parse("O18", "usdb.snt", "0+3,2+2")`.
    pub fn parse(nuclide: &str, interaction: &str, states: &str) -> Result<Self, KshError> {
        Ok(Self::new(
            nuclide.parse()?,
            Interaction::new(interaction),
            parse_state_list(states)?,
            TruncationSpec::none(),
        ))
    }

    /// Builds a descriptor from a campaign entry.
    pub fn from_spec(spec: &RunSpec) -> Result<Self, KshError> {
        Ok(Self::new(
            spec.nuclide,
            Interaction::new(&spec.interaction),
            parse_state_list(&spec.states)?,
            spec.truncation.clone(),
        )
        .with_run_args(spec.run_args.clone()))
    }

    /// Replaces the run arguments.
    pub fn with_run_args(mut self, run_args: RunArgs) -> Self {
        self.run_args = run_args;
        self
    }

    /// Replaces the truncation.
    pub fn with_truncation(mut self, truncation: TruncationSpec) -> Self {
        self.truncation = truncation;
        self
    }

    /// Target nucleus.
    pub fn nuclide(&self) -> NuclideId {
        self.nuclide
    }

    /// Interaction reference.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Requested state blocks; each index is a count.
    pub fn states(&self) -> &[StateLabel] {
        &self.states
    }

    /// Request list in its comma separated form.
    pub fn states_string(&self) -> String {
        join_state_list(&self.states)
    }

    /// Configuration-space truncation.
    pub fn truncation(&self) -> &TruncationSpec {
        &self.truncation
    }

    /// Run-argument overrides.
    pub fn run_args(&self) -> &RunArgs {
        &self.run_args
    }

    /// True when both descriptors produce the same wavefunctions: same
    /// nucleus, interaction, run arguments and truncation.
    pub fn same_system(&self, other: &RunDescriptor) -> bool {
        self.stem() == other.stem()
    }

    /// True when both parities are requested, which the solver treats as an
    /// unnatural-parity run.
    pub fn mixes_parity(&self) -> bool {
        let has = |parity: Parity| self.states.iter().any(|state| state.parity == parity);
        has(Parity::Plus) && has(Parity::Minus)
    }

    /// `{nuclide}_{interaction}`.
    pub fn base_name(&self) -> String {
        format!("{}_{}", self.nuclide, self.interaction.stem())
    }

    /// Truncation- and argument-aware stem shared by every run artefact.
    pub fn stem(&self) -> String {
        format!(
            "{}{}{}",
            self.base_name(),
            self.run_args.fragment(),
            self.truncation.fragment()
        )
    }

    /// Job script name.
    pub fn script_name(&self) -> String {
        format!("{}.sh", self.stem())
    }

    /// Energy summary name.
    pub fn summary_name(&self) -> String {
        format!("summary_{}.txt", self.stem())
    }

    /// Solver file code of a state of this run's nucleus.
    pub fn file_code(&self, state: &StateLabel) -> String {
        state.file_code(self.nuclide.is_odd_mass())
    }

    /// Partition file for the parity block of `state`.
    pub fn partition_name(&self, state: &StateLabel) -> String {
        format!("{}_{}.ptn", self.stem(), state.parity.file_char())
    }

    /// Wavefunction file for the (J, parity) block of `state`.
    pub fn wavefunction_name(&self, state: &StateLabel) -> String {
        format!("{}_{}.wav", self.stem(), self.file_code(state))
    }

    /// Solver log for the (J, parity) block of `state`.
    pub fn log_name(&self, state: &StateLabel) -> String {
        format!("log_{}_{}.txt", self.stem(), self.file_code(state))
    }

    /// Partition files keyed by requested block.
    pub fn partition_files(&self) -> BTreeMap<StateLabel, String> {
        self.states
            .iter()
            .map(|state| (*state, self.partition_name(state)))
            .collect()
    }

    /// Wavefunction files keyed by requested block.
    pub fn wavefunction_files(&self) -> BTreeMap<StateLabel, String> {
        self.states
            .iter()
            .map(|state| (*state, self.wavefunction_name(state)))
            .collect()
    }

    /// Distinct log files, in request order.
    pub fn log_files(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for state in &self.states {
            let name = self.log_name(state);
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    /// Partition and wavefunction paths a transition involving `state`
    /// reads, relative to `dir`.
    pub fn artifacts(&self, dir: &Path, state: &StateLabel) -> [PathBuf; 2] {
        [
            dir.join(self.partition_name(state)),
            dir.join(self.wavefunction_name(state)),
        ]
    }

    /// Paths among [`RunDescriptor::artifacts`] that do not exist yet.
    pub fn missing_artifacts(&self, dir: &Path, state: &StateLabel) -> Vec<PathBuf> {
        self.artifacts(dir, state)
            .into_iter()
            .filter(|path| !path.exists())
            .collect()
    }

    /// Reads this run's energy summary from `dir`.
    pub fn load_energies(
        &self,
        dir: &Path,
        interaction: &dyn InteractionService,
    ) -> Result<EnergyTable, KshError> {
        let path = dir.join(self.summary_name());
        debug!(run = %self.stem(), path = %path.display(), "loading energy summary");
        read_summary(&path, interaction)
    }

    /// Reads the summary using a known zero-body energy.
    pub fn load_energies_with_offset(
        &self,
        dir: &Path,
        zero_body: f64,
    ) -> Result<EnergyTable, KshError> {
        self.load_energies(dir, &ZeroBodyOffset(zero_body))
    }

    /// Looks up the requested block that covers `state` (same J and parity).
    pub fn requested_block(&self, state: &StateLabel) -> Result<StateLabel, KshError> {
        self.states
            .iter()
            .find(|block| block.j == state.j && block.parity == state.parity)
            .copied()
            .ok_or_else(|| {
                KshError::Format(
                    ErrorInfo::new("state-not-requested", "state block not part of this run")
                        .with_context("run", self.stem())
                        .with_context("state", state.to_string()),
                )
            })
    }
}
