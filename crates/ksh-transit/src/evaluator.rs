//! Transition-density evaluation seam.
//!
//! Reading density files and contracting them with an operator belongs to
//! an external tool; campaigns only need the reduced components it
//! returns. [`TabulatedDensity`] serves precomputed components from YAML.

use std::fs;
use std::path::Path;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::serde::from_yaml_slice;
use ksh_core::{Parity, StateLabel};
use serde::{Deserialize, Serialize};

/// Operator quantum numbers as seen by the selection rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Free-form name, usually the operator file.
    pub name: String,
    /// Angular-momentum rank.
    #[serde(default)]
    pub rank: u32,
    /// Parity.
    #[serde(default = "default_parity")]
    pub parity: Parity,
    /// Change of proton number caused by the operator.
    #[serde(default)]
    pub rank_z: i32,
}

fn default_parity() -> Parity {
    Parity::Plus
}

impl OperatorSpec {
    /// Operator with rank and parity; `rank_z` defaults to zero.
    pub fn new(name: impl Into<String>, rank: u32, parity: Parity) -> Self {
        Self {
            name: name.into(),
            rank,
            parity,
            rank_z: 0,
        }
    }

    /// Gamow-Teller-like operator: rank 1, positive parity, one unit of charge.
    pub fn gamow_teller(name: impl Into<String>) -> Self {
        Self {
            rank_z: 1,
            ..Self::new(name, 1, Parity::Plus)
        }
    }
}

/// Evaluates an operator between two eigenstates stored in a density file.
pub trait DensityEvaluator {
    /// Reduced components of `<bra||operator||ket>`; the labels' indices
    /// are 1-based eigenvector ordinals.
    fn evaluate(
        &self,
        density_file: &str,
        bra: &StateLabel,
        ket: &StateLabel,
        operator: &OperatorSpec,
    ) -> Result<Vec<f64>, KshError>;

    /// Sum of the reduced components.
    fn amplitude(
        &self,
        density_file: &str,
        bra: &StateLabel,
        ket: &StateLabel,
        operator: &OperatorSpec,
    ) -> Result<f64, KshError> {
        Ok(self
            .evaluate(density_file, bra, ket, operator)?
            .iter()
            .sum())
    }
}

/// One tabulated matrix element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedEntry {
    /// Density file the value belongs to.
    pub file: String,
    /// Bra state.
    pub bra: StateLabel,
    /// Ket state.
    pub ket: StateLabel,
    /// Restricts the entry to one operator name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Reduced components.
    pub components: Vec<f64>,
}

/// Precomputed matrix elements, looked up by file and states.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabulatedDensity {
    /// Entries in file order; the first match wins.
    #[serde(default)]
    pub entries: Vec<TabulatedEntry>,
}

impl TabulatedDensity {
    /// Adds an entry usable with any operator.
    pub fn insert(&mut self, file: impl Into<String>, bra: StateLabel, ket: StateLabel, components: Vec<f64>) {
        self.entries.push(TabulatedEntry {
            file: file.into(),
            bra,
            ket,
            operator: None,
            components,
        });
    }

    /// Loads a YAML table.
    pub fn load(path: &Path) -> Result<Self, KshError> {
        let bytes =
            fs::read(path).map_err(|err| KshError::io("density_table_read", path.display(), err))?;
        from_yaml_slice(&bytes)
    }
}

impl DensityEvaluator for TabulatedDensity {
    fn evaluate(
        &self,
        density_file: &str,
        bra: &StateLabel,
        ket: &StateLabel,
        operator: &OperatorSpec,
    ) -> Result<Vec<f64>, KshError> {
        self.entries
            .iter()
            .find(|entry| {
                entry.file == density_file
                    && entry.bra == *bra
                    && entry.ket == *ket
                    && entry
                        .operator
                        .as_deref()
                        .map_or(true, |name| name == operator.name)
            })
            .map(|entry| entry.components.clone())
            .ok_or_else(|| {
                KshError::MissingArtifact(
                    ErrorInfo::new("density-entry-missing", "no tabulated matrix element")
                        .with_context("file", density_file)
                        .with_context("bra", bra.to_string())
                        .with_context("ket", ket.to_string())
                        .with_context("operator", operator.name.clone()),
                )
            })
    }
}
