//! Double-beta decay through computed intermediate states.
//!
//! For a final state `f`, initial state `i` and intermediate states `m` of
//! angular momentum `J` and the operator's parity,
//!
//! ```text
//! M_J = sum_m <f||O||m> <m||O||i> / (E_m - E_ground + Q)
//! M   = sum_J M_J
//! ```
//!
//! Different `J` blocks are added without interference terms.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::serde::from_yaml_slice;
use ksh_core::{NuclideId, Parity, Spin, StateLabel, TruncationSpec};
use ksh_run::{EnergyTable, Interaction, RunArgs, RunDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::density::{DensityFileKey, DensityKind};
use crate::evaluator::{DensityEvaluator, OperatorSpec};

/// Which pair of like nucleons turns into the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayDirection {
    /// Two neutrons become two protons.
    #[serde(rename = "nn->pp")]
    NeutronsToProtons,
    /// Two protons become two neutrons.
    #[serde(rename = "pp->nn")]
    ProtonsToNeutrons,
}

impl DecayDirection {
    /// Proton-number change per step.
    pub fn step(&self) -> i32 {
        match self {
            DecayDirection::NeutronsToProtons => 1,
            DecayDirection::ProtonsToNeutrons => -1,
        }
    }
}

impl fmt::Display for DecayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayDirection::NeutronsToProtons => write!(f, "nn->pp"),
            DecayDirection::ProtonsToNeutrons => write!(f, "pp->nn"),
        }
    }
}

impl FromStr for DecayDirection {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "nn->pp" => Ok(DecayDirection::NeutronsToProtons),
            "pp->nn" => Ok(DecayDirection::ProtonsToNeutrons),
            other => Err(KshError::Format(
                ErrorInfo::new("decay-direction", "unknown decay direction")
                    .with_context("input", other)
                    .with_hint("expected nn->pp or pp->nn"),
            )),
        }
    }
}

/// Parent, intermediate and daughter nuclei of a double-beta decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayChain {
    /// Decaying nucleus.
    pub parent: NuclideId,
    /// Odd-odd nucleus reached after one step.
    pub intermediate: NuclideId,
    /// Final nucleus.
    pub daughter: NuclideId,
    /// Direction of the decay.
    pub direction: DecayDirection,
}

impl DecayChain {
    /// Builds the chain; fails when a neighbour falls off the chart.
    pub fn new(parent: NuclideId, direction: DecayDirection) -> Result<Self, KshError> {
        let step = direction.step();
        Ok(Self {
            parent,
            intermediate: parent.shifted(step, -step)?,
            daughter: parent.shifted(2 * step, -2 * step)?,
            direction,
        })
    }

    /// Run computing the candidate lowest states of the intermediate
    /// nucleus, one per requested parity.
    pub fn ground_candidates(
        &self,
        interaction: &Interaction,
        truncation: &TruncationSpec,
        run_args: &RunArgs,
        parities: &[Parity],
    ) -> RunDescriptor {
        let states = parities
            .iter()
            .map(|parity| StateLabel::parity_only(*parity, 1))
            .collect();
        RunDescriptor::new(self.intermediate, interaction.clone(), states, truncation.clone())
            .with_run_args(run_args.clone())
    }
}

/// Intermediate spins reachable from both the final and the initial state
/// with an operator of rank `rank`.
///
/// Fails with a selection-rule error when `|J_final - J_initial| > 2 rank`.
pub fn allowed_intermediate_spins(
    final_j: Spin,
    initial_j: Spin,
    rank: u32,
) -> Result<Vec<Spin>, KshError> {
    let bra = i64::from(final_j.twice());
    let ket = i64::from(initial_j.twice());
    let rank2 = 2 * i64::from(rank);
    if (bra - ket).abs() > 2 * rank2 {
        return Err(KshError::SelectionRule(
            ErrorInfo::new("closure-rank", "bra and ket cannot be connected twice by the operator")
                .with_context("final_j", final_j.to_string())
                .with_context("initial_j", initial_j.to_string())
                .with_context("rank", rank.to_string()),
        ));
    }
    let reachable_from_ket = |j2: i64| (ket - rank2).abs() <= j2 && j2 <= ket + rank2;
    Ok(((bra - rank2).abs()..=bra + rank2)
        .step_by(2)
        .filter(|j2| reachable_from_ket(*j2))
        .map(|j2| Spin::from_twice(j2 as u32))
        .collect())
}

fn definite_spin(state: &StateLabel, role: &str) -> Result<Spin, KshError> {
    state.j.ok_or_else(|| {
        KshError::Format(
            ErrorInfo::new("closure-spin", "closure sums need states with a definite J")
                .with_context("role", role)
                .with_context("state", state.to_string()),
        )
    })
}

/// Request list for the intermediate run: `n_states` states of every
/// allowed spin with the operator's parity.
pub fn intermediate_requests(
    final_state: &StateLabel,
    initial_state: &StateLabel,
    operator: &OperatorSpec,
    n_states: u32,
) -> Result<Vec<StateLabel>, KshError> {
    let spins = allowed_intermediate_spins(
        definite_spin(final_state, "final")?,
        definite_spin(initial_state, "initial")?,
        operator.rank,
    )?;
    Ok(spins
        .into_iter()
        .map(|j| StateLabel::new(j, operator.parity, n_states))
        .collect())
}

/// Inputs of one closure evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ClosureInput<'a> {
    /// Daughter run holding the final state.
    pub final_run: &'a RunDescriptor,
    /// Final state (bra).
    pub final_state: StateLabel,
    /// Parent run holding the initial state.
    pub initial_run: &'a RunDescriptor,
    /// Initial state (ket).
    pub initial_state: StateLabel,
    /// Intermediate run; its requests bound the states summed over.
    pub intermediate_run: &'a RunDescriptor,
    /// Energies of the intermediate run.
    pub intermediate_energies: &'a EnergyTable,
    /// Ground-state energy of the intermediate nucleus; the lowest entry
    /// of `intermediate_energies` when absent.
    pub ground_energy: Option<f64>,
    /// Operator applied in both steps.
    pub operator: &'a OperatorSpec,
    /// Energy shift added to every denominator.
    pub q_value: f64,
}

/// Contribution of one intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosureRow {
    /// Intermediate state.
    pub state: StateLabel,
    /// `<final||O||m>`.
    pub left: f64,
    /// `<m||O||initial>`.
    pub right: f64,
    /// `E_m - E_ground + Q`.
    pub denominator: f64,
    /// Running sum within this J block.
    pub running: f64,
}

/// Sum over one intermediate J block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSum {
    /// Intermediate spin.
    pub j: Spin,
    /// Intermediate parity.
    pub parity: Parity,
    /// States summed over.
    pub states: u32,
    /// Block total.
    pub value: f64,
}

/// Result of a closure evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureReport {
    /// Ground energy used in the denominators.
    pub ground_energy: f64,
    /// One row per intermediate state, in summation order.
    pub rows: Vec<ClosureRow>,
    /// Per-J totals.
    pub blocks: Vec<BlockSum>,
    /// Sum of the per-J totals.
    pub total: f64,
}

/// Evaluates the closure sum.
///
/// Near-degenerate denominators are not guarded; they produce large
/// contributions.
pub fn closure_sum(
    input: &ClosureInput<'_>,
    evaluator: &dyn DensityEvaluator,
) -> Result<ClosureReport, KshError> {
    let spins = allowed_intermediate_spins(
        definite_spin(&input.final_state, "final")?,
        definite_spin(&input.initial_state, "initial")?,
        input.operator.rank,
    )?;
    let ground_energy = match input.ground_energy {
        Some(energy) => energy,
        None => input
            .intermediate_energies
            .lowest()
            .map(|(_, energy)| energy)
            .ok_or_else(|| {
                KshError::MissingArtifact(
                    ErrorInfo::new("closure-energies", "intermediate energy table is empty")
                        .with_context("run", input.intermediate_run.stem()),
                )
            })?,
    };

    let mut rows = Vec::new();
    let mut blocks = Vec::new();
    let mut total = 0.0;
    for j in spins {
        let block = StateLabel::new(j, input.operator.parity, 1);
        let requested = input.intermediate_run.requested_block(&block)?.index;
        let available = input
            .intermediate_energies
            .block_len(block.j, block.parity);
        let count = requested.min(available);
        let mut block_sum = 0.0;
        for index in 1..=count {
            let state = block.with_index(index);
            let left = amplitude(
                input.final_run,
                input.final_state,
                input.intermediate_run,
                state,
                evaluator,
                input.operator,
            )?;
            let right = amplitude(
                input.intermediate_run,
                state,
                input.initial_run,
                input.initial_state,
                evaluator,
                input.operator,
            )?;
            let energy = input.intermediate_energies.get(&state).ok_or_else(|| {
                KshError::MissingArtifact(
                    ErrorInfo::new("closure-energy", "intermediate state has no energy")
                        .with_context("state", state.to_string()),
                )
            })?;
            let denominator = energy - ground_energy + input.q_value;
            block_sum += left * right / denominator;
            rows.push(ClosureRow {
                state,
                left,
                right,
                denominator,
                running: block_sum,
            });
        }
        debug!(j = %j, states = count, value = block_sum, "intermediate block summed");
        blocks.push(BlockSum {
            j,
            parity: block.parity,
            states: count,
            value: block_sum,
        });
        total += block_sum;
    }
    info!(
        final_state = %input.final_state,
        initial_state = %input.initial_state,
        total,
        "closure sum evaluated"
    );
    Ok(ClosureReport {
        ground_energy,
        rows,
        blocks,
        total,
    })
}

// Amplitude of <left|O|right> with the pair canonicalized; the evaluator
// always sees bra/ket order, matching how density files are produced. No
// phase or (2J+1) factor is applied when the pair is flipped.
fn amplitude(
    left: &RunDescriptor,
    left_state: StateLabel,
    right: &RunDescriptor,
    right_state: StateLabel,
    evaluator: &dyn DensityEvaluator,
    operator: &OperatorSpec,
) -> Result<f64, KshError> {
    let key = DensityFileKey::new(left, left_state, right, right_state, DensityKind::Density);
    evaluator.amplitude(&key.filename(), &key.bra_state(), &key.ket_state(), operator)
}

/// The three runs of a decay chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRuns {
    /// Parent run with the initial state.
    pub initial: RunDescriptor,
    /// Daughter run with the final state.
    pub final_run: RunDescriptor,
    /// Intermediate run with every allowed block.
    pub intermediate: RunDescriptor,
}

/// YAML description of one closure evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureConfig {
    /// Directory holding the runs' summaries.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Decaying nucleus.
    pub parent: NuclideId,
    /// Interaction shared by all three runs.
    pub interaction: PathBuf,
    /// Decay direction.
    #[serde(default = "default_direction")]
    pub direction: DecayDirection,
    /// Initial state of the parent.
    pub initial: StateLabel,
    /// Final state of the daughter.
    #[serde(rename = "final")]
    pub final_state: StateLabel,
    /// States per intermediate block.
    #[serde(default = "default_intermediate_states")]
    pub n_states: u32,
    /// Energy shift added to the denominators.
    #[serde(default)]
    pub q_value: f64,
    /// Zero-body energy of the interaction.
    #[serde(default)]
    pub zero_body: f64,
    /// Optional intermediate ground-state energy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_energy: Option<f64>,
    /// Truncation shared by all three runs.
    #[serde(default)]
    pub truncation: TruncationSpec,
    /// Run arguments shared by all three runs.
    #[serde(default)]
    pub run_args: RunArgs,
    /// Transition operator.
    pub operator: OperatorSpec,
    /// Tabulated matrix elements.
    pub densities: PathBuf,
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_direction() -> DecayDirection {
    DecayDirection::NeutronsToProtons
}

fn default_intermediate_states() -> u32 {
    300
}

impl ClosureConfig {
    /// Decay chain of the configured parent.
    pub fn chain(&self) -> Result<DecayChain, KshError> {
        DecayChain::new(self.parent, self.direction)
    }

    /// Descriptors of the parent, daughter and intermediate runs.
    pub fn runs(&self) -> Result<ChainRuns, KshError> {
        let chain = self.chain()?;
        let interaction = Interaction::new(&self.interaction);
        let run = |nuclide: NuclideId, states: Vec<StateLabel>| {
            RunDescriptor::new(nuclide, interaction.clone(), states, self.truncation.clone())
                .with_run_args(self.run_args.clone())
        };
        let intermediate = intermediate_requests(
            &self.final_state,
            &self.initial,
            &self.operator,
            self.n_states,
        )?;
        Ok(ChainRuns {
            initial: run(chain.parent, vec![self.initial]),
            final_run: run(chain.daughter, vec![self.final_state]),
            intermediate: run(chain.intermediate, intermediate),
        })
    }

    /// Densities path resolved against `base` when relative.
    pub fn densities_path(&self, base: &Path) -> PathBuf {
        resolve_against(base, &self.densities)
    }

    /// Solver output directory resolved against `base` when relative.
    pub fn workdir_path(&self, base: &Path) -> PathBuf {
        resolve_against(base, &self.workdir)
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Loads a closure description from YAML.
pub fn load_closure_config(path: &Path) -> Result<ClosureConfig, KshError> {
    let bytes =
        fs::read(path).map_err(|err| KshError::io("closure_config_read", path.display(), err))?;
    from_yaml_slice(&bytes)
}
