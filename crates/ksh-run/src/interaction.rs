//! Interaction references and the zero-body energy seam.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Reference to an interaction file. Only the stem matters for naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interaction {
    path: PathBuf,
}

impl Interaction {
    /// Wraps an interaction path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path as supplied.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directory or extension, e.g. `usdb` for `int/usdb.snt`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read-only view on a parsed interaction.
///
/// The interaction file format is owned by an external reader; campaigns
/// only need the constant energy shift between solver output and
/// absolute energies.
pub trait InteractionService {
    /// Zero-body matrix element added to every solver eigenvalue.
    fn zero_body_energy(&self) -> f64;
}

/// Interaction service backed by a known zero-body energy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZeroBodyOffset(pub f64);

impl InteractionService for ZeroBodyOffset {
    fn zero_body_energy(&self) -> f64 {
        self.0
    }
}
