//! Configuration-space truncations and their canonical file-name fragments.
//!
//! The fragment always renders the global cutoff first (`_hw{n}`) and the
//! per-orbit windows second (`_ph{i}_{min}_{max}-...`), with windows sorted
//! by orbit index, so equal truncations always produce equal names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KshError};

/// Occupation window `[min, max]` imposed on one orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrbitWindow {
    /// Orbit index in the interaction's single-particle basis.
    pub orbit: u32,
    /// Minimum occupation.
    pub min: u32,
    /// Maximum occupation.
    pub max: u32,
}

impl fmt::Display for OrbitWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.orbit, self.min, self.max)
    }
}

impl FromStr for OrbitWindow {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = || {
            KshError::Format(
                ErrorInfo::new("orbit-window-format", "expected orbit_min_max")
                    .with_context("input", text),
            )
        };
        let fields: Vec<u32> = text
            .split('_')
            .map(|field| field.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| error())?;
        let (orbit, min, max) = match fields.as_slice() {
            [orbit, min, max] => (*orbit, *min, *max),
            _ => return Err(error()),
        };
        if min > max {
            return Err(KshError::Format(
                ErrorInfo::new("orbit-window-order", "minimum occupation exceeds maximum")
                    .with_context("input", text),
            ));
        }
        Ok(Self { orbit, min, max })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTruncation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hw: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ph: Option<String>,
}

/// Optional global excitation cutoff plus optional per-orbit windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTruncation", into = "RawTruncation")]
pub struct TruncationSpec {
    hw: Option<u32>,
    orbits: Vec<OrbitWindow>,
}

impl TruncationSpec {
    /// No truncation at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a truncation, canonicalizing the window order.
    pub fn new(hw: Option<u32>, mut orbits: Vec<OrbitWindow>) -> Result<Self, KshError> {
        orbits.sort();
        if let Some(pair) = orbits.windows(2).find(|pair| pair[0].orbit == pair[1].orbit) {
            return Err(KshError::Format(
                ErrorInfo::new("orbit-window-duplicate", "orbit restricted twice")
                    .with_context("orbit", pair[0].orbit.to_string()),
            ));
        }
        Ok(Self { hw, orbits })
    }

    /// Global cutoff only.
    pub fn hw(cutoff: u32) -> Self {
        Self {
            hw: Some(cutoff),
            orbits: Vec::new(),
        }
    }

    /// Parses the `-` joined window list, e.g. `"1_0_2-3_0_4"`.
    pub fn parse_orbits(text: &str) -> Result<Vec<OrbitWindow>, KshError> {
        text.split('-')
            .filter(|entry| !entry.trim().is_empty())
            .map(str::parse)
            .collect()
    }

    /// Global excitation cutoff, if any.
    pub fn hw_cutoff(&self) -> Option<u32> {
        self.hw
    }

    /// Per-orbit windows in canonical order.
    pub fn orbit_windows(&self) -> &[OrbitWindow] {
        &self.orbits
    }

    /// True when neither restriction is present.
    pub fn is_none(&self) -> bool {
        self.hw.is_none() && self.orbits.is_empty()
    }

    /// `-` joined window list, `None` without windows.
    pub fn orbit_string(&self) -> Option<String> {
        if self.orbits.is_empty() {
            return None;
        }
        Some(
            self.orbits
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("-"),
        )
    }

    /// File-name fragment, empty when untruncated.
    pub fn fragment(&self) -> String {
        let mut out = String::new();
        if let Some(hw) = self.hw {
            out.push_str(&format!("_hw{hw}"));
        }
        if let Some(ph) = self.orbit_string() {
            out.push_str("_ph");
            out.push_str(&ph);
        }
        out
    }
}

impl TryFrom<RawTruncation> for TruncationSpec {
    type Error = KshError;

    fn try_from(raw: RawTruncation) -> Result<Self, Self::Error> {
        let orbits = match raw.ph.as_deref() {
            Some(text) => Self::parse_orbits(text)?,
            None => Vec::new(),
        };
        Self::new(raw.hw, orbits)
    }
}

impl From<TruncationSpec> for RawTruncation {
    fn from(spec: TruncationSpec) -> Self {
        RawTruncation {
            hw: spec.hw,
            ph: spec.orbit_string(),
        }
    }
}
