//! Per-state occupations read from solver logs.
//!
//! A record starts on a line whose second token is `<H>:` and collects
//! the `<Hcm>:`/`<TT>:`, `<p Nj>`, `<n Nj>` and `hw:` lines that follow it
//! until the next record or the end of the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::{Parity, Spin};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::interaction::InteractionService;
use crate::summary::nudge_past;

/// Quantum numbers, occupations and excitation histogram of one eigenstate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOccupation {
    /// Log the record came from.
    pub log: String,
    /// Eigenvector number inside the log.
    pub eigen_index: u32,
    /// Absolute energy; [`read_logs`] keeps these pairwise distinct.
    pub energy: f64,
    /// Total angular momentum.
    pub j: Spin,
    /// Parity.
    pub parity: Parity,
    /// Doubled isospin, when the log reports it.
    pub isospin2: Option<u32>,
    /// Proton occupation per orbit.
    pub proton: Vec<f64>,
    /// Neutron occupation per orbit.
    pub neutron: Vec<f64>,
    /// Probability per number of oscillator quanta.
    pub hw_distribution: BTreeMap<u32, f64>,
}

impl StateOccupation {
    /// Angular momentum as a float.
    pub fn j_value(&self) -> f64 {
        self.j.as_f64()
    }

    /// Total proton number carried by the occupations.
    pub fn proton_total(&self) -> f64 {
        self.proton.iter().sum()
    }

    /// Total neutron number carried by the occupations.
    pub fn neutron_total(&self) -> f64 {
        self.neutron.iter().sum()
    }
}

fn halves(token: &str) -> Option<u32> {
    token.strip_suffix("/2")?.parse().ok()
}

fn header(tokens: &[&str], log: &str, energy_offset: f64) -> Option<StateOccupation> {
    let eigen_index = tokens.first()?.parse().ok()?;
    let energy = tokens.get(2)?.parse::<f64>().ok()? + energy_offset;
    let j = Spin::from_twice(halves(tokens.get(6)?)?);
    let parity = Parity::from_sign(tokens.get(8)?.parse().ok()?);
    Some(StateOccupation {
        log: log.to_string(),
        eigen_index,
        energy,
        j,
        parity,
        isospin2: None,
        proton: Vec::new(),
        neutron: Vec::new(),
        hw_distribution: BTreeMap::new(),
    })
}

fn floats(tokens: &[&str]) -> Vec<f64> {
    tokens.iter().filter_map(|token| token.parse().ok()).collect()
}

fn histogram(tokens: &[&str]) -> BTreeMap<u32, f64> {
    tokens
        .iter()
        .filter_map(|token| {
            let (quanta, prob) = token.split_once(':')?;
            Some((quanta.parse().ok()?, prob.parse().ok()?))
        })
        .collect()
}

fn absorb(record: &mut StateOccupation, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first().copied() {
        Some("<Hcm>:") => record.isospin2 = tokens.get(5).and_then(|t| halves(t)),
        Some("<TT>:") => record.isospin2 = tokens.get(3).and_then(|t| halves(t)),
        Some("<p") if tokens.get(1) == Some(&"Nj>") => record.proton = floats(&tokens[2..]),
        Some("<n") if tokens.get(1) == Some(&"Nj>") => record.neutron = floats(&tokens[2..]),
        Some("hw:") => record.hw_distribution = histogram(&tokens[1..]),
        _ => {}
    }
}

fn push_distinct(records: &mut Vec<StateOccupation>, mut record: StateOccupation) {
    let taken: Vec<f64> = records.iter().map(|existing| existing.energy).collect();
    record.energy = nudge_past(record.energy, &taken);
    records.push(record);
}

/// Parses every eigenstate record of one log. Energies within the log are
/// kept pairwise distinct.
pub fn parse_log(text: &str, log: &str, interaction: &dyn InteractionService) -> Vec<StateOccupation> {
    let offset = interaction.zero_body_energy();
    let mut records = Vec::new();
    let mut current: Option<StateOccupation> = None;
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.get(1) == Some(&"<H>:") {
            if let Some(done) = current.take() {
                push_distinct(&mut records, done);
            }
            current = header(&tokens, log, offset);
            if current.is_none() {
                trace!(line, "skipping malformed eigenstate header");
            }
            continue;
        }
        if let Some(record) = current.as_mut() {
            absorb(record, line);
        }
    }
    if let Some(done) = current {
        push_distinct(&mut records, done);
    }
    records
}

/// Reads several logs; energies are made pairwise distinct across all of
/// them and the result is sorted by energy.
pub fn read_logs(
    paths: &[&Path],
    interaction: &dyn InteractionService,
) -> Result<Vec<StateOccupation>, KshError> {
    let mut out: Vec<StateOccupation> = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(KshError::MissingArtifact(
                ErrorInfo::new("log-missing", "solver log not produced yet")
                    .with_context("path", path.display().to_string()),
            ));
        }
        let text =
            fs::read_to_string(path).map_err(|err| KshError::io("log_read", path.display(), err))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let records = parse_log(&text, &name, interaction);
        debug!(log = %name, states = records.len(), "parsed solver log");
        for record in records {
            push_distinct(&mut out, record);
        }
    }
    out.sort_by(|a, b| a.energy.total_cmp(&b.energy));
    Ok(out)
}
