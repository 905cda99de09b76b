//! Density-file keys: one canonical name per physical transition.
//!
//! Names follow
//! `{density|SF}_{ket interaction}{ket truncation}_{bra nucleus}{bra code}_{ket nucleus}{ket code}.txt`
//! with both sides already in bra/ket order.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::StateLabel;
use ksh_run::RunDescriptor;
use serde::{Deserialize, Serialize};

use crate::pair::order;

/// What the density tool is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DensityKind {
    /// One- and two-body transition densities.
    #[default]
    Density,
    /// Spectroscopic factors for one-nucleon transfer.
    StrengthFunction,
}

impl DensityKind {
    /// File-name prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            DensityKind::Density => "density",
            DensityKind::StrengthFunction => "SF",
        }
    }
}

impl fmt::Display for DensityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityKind::Density => write!(f, "density"),
            DensityKind::StrengthFunction => write!(f, "strength-function"),
        }
    }
}

impl FromStr for DensityKind {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "density" => Ok(DensityKind::Density),
            "strength-function" | "sf" | "SF" => Ok(DensityKind::StrengthFunction),
            other => Err(KshError::Format(
                ErrorInfo::new("density-kind", "unknown density kind")
                    .with_context("input", other)
                    .with_hint("expected density or strength-function"),
            )),
        }
    }
}

/// A transition between one state of each run, stored in bra/ket order.
#[derive(Debug, Clone, Copy)]
pub struct DensityFileKey<'a> {
    bra: &'a RunDescriptor,
    bra_state: StateLabel,
    ket: &'a RunDescriptor,
    ket_state: StateLabel,
    kind: DensityKind,
    flipped: bool,
}

impl<'a> DensityFileKey<'a> {
    /// Canonicalizes a caller-ordered (left, right) transition.
    pub fn new(
        left: &'a RunDescriptor,
        left_state: StateLabel,
        right: &'a RunDescriptor,
        right_state: StateLabel,
        kind: DensityKind,
    ) -> Self {
        let ordered = order(left, right);
        let (bra_state, ket_state) = ordered.orient(left_state, right_state);
        Self {
            bra: ordered.bra,
            bra_state,
            ket: ordered.ket,
            ket_state,
            kind,
            flipped: ordered.flipped,
        }
    }

    /// Bra-side run.
    pub fn bra(&self) -> &'a RunDescriptor {
        self.bra
    }

    /// Ket-side run.
    pub fn ket(&self) -> &'a RunDescriptor {
        self.ket
    }

    /// Bra-side state.
    pub fn bra_state(&self) -> StateLabel {
        self.bra_state
    }

    /// Ket-side state.
    pub fn ket_state(&self) -> StateLabel {
        self.ket_state
    }

    /// Requested density kind.
    pub fn kind(&self) -> DensityKind {
        self.kind
    }

    /// True when the caller's left side ended up as the ket.
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Canonical density-file name.
    pub fn filename(&self) -> String {
        format!(
            "{}_{}{}_{}{}_{}{}.txt",
            self.kind.prefix(),
            self.ket.interaction().stem(),
            self.ket.truncation().fragment(),
            self.bra.nuclide(),
            self.bra.file_code(&self.bra_state),
            self.ket.nuclide(),
            self.ket.file_code(&self.ket_state),
        )
    }

    /// Partition and wavefunction files of both sides, bra first.
    pub fn inputs(&self, dir: &Path) -> Vec<PathBuf> {
        let mut out = self.bra.artifacts(dir, &self.bra_state).to_vec();
        out.extend(self.ket.artifacts(dir, &self.ket_state));
        out
    }

    /// Inputs that do not exist under `dir`.
    pub fn missing_inputs(&self, dir: &Path) -> Vec<PathBuf> {
        self.inputs(dir)
            .into_iter()
            .filter(|path| !path.exists())
            .collect()
    }

    /// Path of the density file under `dir`.
    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(self.filename())
    }
}
