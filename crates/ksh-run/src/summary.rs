//! Energy summaries written by the solver's log collector.
//!
//! Rows look like
//!
//! ```text
//!    1   0 +     1     1   -12.345    0.000  log_O18_usdb_j0p.txt
//! ```
//!
//! i.e. level, J, parity, ordinal within the block, isospin, energy,
//! excitation energy and the originating log. Header lines and anything
//! else that fails to convert are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::{Parity, Spin, StateLabel};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::interaction::InteractionService;

/// Increment applied to an energy that collides with a stored one.
pub const ENERGY_NUDGE: f64 = 1e-6;

/// Moves `energy` upward in [`ENERGY_NUDGE`] steps until no value in
/// `taken` equals it exactly.
pub fn nudge_past(mut energy: f64, taken: &[f64]) -> f64 {
    while taken.iter().any(|existing| *existing == energy) {
        energy += ENERGY_NUDGE;
    }
    energy
}

/// Absolute energies keyed by state label.
///
/// Energies are kept pairwise distinct so they can serve as sort keys;
/// colliding values are nudged by [`ENERGY_NUDGE`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyTable {
    energies: BTreeMap<StateLabel, f64>,
}

impl EnergyTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an energy and returns the value actually stored.
    pub fn insert(&mut self, label: StateLabel, energy: f64) -> f64 {
        let taken: Vec<f64> = self
            .energies
            .iter()
            .filter(|(key, _)| **key != label)
            .map(|(_, value)| *value)
            .collect();
        let stored = nudge_past(energy, &taken);
        self.energies.insert(label, stored);
        stored
    }

    /// Energy of one state.
    pub fn get(&self, label: &StateLabel) -> Option<f64> {
        self.energies.get(label).copied()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// True without any state.
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// Lowest level in the table (not necessarily the ground state of the
    /// nucleus when only some blocks were computed).
    pub fn lowest(&self) -> Option<(StateLabel, f64)> {
        self.levels().into_iter().next()
    }

    /// All levels sorted by energy.
    pub fn levels(&self) -> Vec<(StateLabel, f64)> {
        let mut levels: Vec<(StateLabel, f64)> =
            self.energies.iter().map(|(key, value)| (*key, *value)).collect();
        levels.sort_by(|a, b| a.1.total_cmp(&b.1));
        levels
    }

    /// Number of consecutive ordinals `1..=n` present for a block.
    pub fn block_len(&self, j: Option<Spin>, parity: Parity) -> u32 {
        let mut count = 0;
        while self
            .energies
            .contains_key(&StateLabel { j, parity, index: count + 1 })
        {
            count += 1;
        }
        count
    }

    /// Iterates in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateLabel, &f64)> {
        self.energies.iter()
    }
}

/// One well-formed summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Running level number.
    pub level: u32,
    /// State label.
    pub label: StateLabel,
    /// Solver energy before the zero-body shift.
    pub raw_energy: f64,
    /// Trailing log-file column, when present.
    pub log: Option<String>,
}

fn parse_spin_column(text: &str) -> Option<Option<Spin>> {
    // parity-only runs print -1 for J
    if text == "-1" {
        return Some(None);
    }
    text.parse::<Spin>().ok().map(Some)
}

fn parse_row(line: &str) -> Option<SummaryRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }
    let level = fields[0].parse::<u32>().ok()?;
    let j = parse_spin_column(fields[1])?;
    let parity = fields[2].parse::<Parity>().ok()?;
    let index = fields[3].parse::<u32>().ok()?;
    let raw_energy = fields[5].parse::<f64>().ok()?;
    let log = fields
        .get(7..)
        .and_then(|rest| rest.last())
        .map(|name| name.to_string());
    Some(SummaryRow {
        level,
        label: StateLabel { j, parity, index },
        raw_energy,
        log,
    })
}

/// Well-formed rows of a summary, in file order.
pub fn summary_rows(text: &str) -> Vec<SummaryRow> {
    text.lines()
        .filter_map(|line| {
            let row = parse_row(line);
            if row.is_none() && !line.trim().is_empty() {
                trace!(line, "skipping non-data summary line");
            }
            row
        })
        .collect()
}

/// Builds the energy table of a summary, shifting every energy by the
/// interaction's zero-body term.
pub fn parse_summary(text: &str, interaction: &dyn InteractionService) -> EnergyTable {
    let offset = interaction.zero_body_energy();
    let mut table = EnergyTable::new();
    for row in summary_rows(text) {
        table.insert(row.label, row.raw_energy + offset);
    }
    table
}

fn read_text(path: &Path) -> Result<String, KshError> {
    if !path.exists() {
        return Err(KshError::MissingArtifact(
            ErrorInfo::new("summary-missing", "energy summary not produced yet")
                .with_context("path", path.display().to_string()),
        ));
    }
    fs::read_to_string(path).map_err(|err| KshError::io("summary_read", path.display(), err))
}

/// Reads and parses a summary file.
pub fn read_summary(
    path: &Path,
    interaction: &dyn InteractionService,
) -> Result<EnergyTable, KshError> {
    Ok(parse_summary(&read_text(path)?, interaction))
}

/// Position of a state inside the log that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavefunctionRef {
    /// Log file named in the summary.
    pub log: String,
    /// 1-based eigenvector number inside that log's wavefunction file.
    pub position: u32,
}

impl WavefunctionRef {
    /// Wavefunction file written next to the log: `log_X.txt` -> `X.wav`.
    pub fn wavefunction_name(&self) -> String {
        let name = self.log.strip_prefix("log_").unwrap_or(&self.log);
        let name = name.strip_suffix(".txt").unwrap_or(name);
        format!("{name}.wav")
    }
}

/// Maps states to the wavefunction file and eigenvector that hold them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WavefunctionIndex {
    entries: BTreeMap<StateLabel, WavefunctionRef>,
}

impl WavefunctionIndex {
    /// Lookup by state.
    pub fn get(&self, label: &StateLabel) -> Option<&WavefunctionRef> {
        self.entries.get(label)
    }

    /// Number of indexed states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no row carried a log column.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the wavefunction index from the summary's log column. Positions
/// count rows per log in summary order.
pub fn parse_wavefunction_index(text: &str) -> WavefunctionIndex {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut entries = BTreeMap::new();
    for row in summary_rows(text) {
        let Some(log) = row.log else {
            continue;
        };
        let position = counts.entry(log.clone()).or_insert(0);
        *position += 1;
        entries.insert(
            row.label,
            WavefunctionRef {
                log,
                position: *position,
            },
        );
    }
    WavefunctionIndex { entries }
}

/// Reads a summary file and indexes its wavefunctions.
pub fn read_wavefunction_index(path: &Path) -> Result<WavefunctionIndex, KshError> {
    Ok(parse_wavefunction_index(&read_text(path)?))
}
