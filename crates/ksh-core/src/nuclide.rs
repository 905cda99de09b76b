//! Nuclide identifiers ("O18" <-> Z, N, A).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KshError};

/// Element symbols indexed by proton number. Index 0 is the free-neutron
/// placeholder, spelled so that title-casing never aliases nitrogen.
pub const PERIODIC_TABLE: [&str; 119] = [
    "Nn", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Proton and neutron numbers of a nucleus. `A = Z + N` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NuclideId {
    z: u32,
    n: u32,
}

impl NuclideId {
    /// Builds an identifier from proton and neutron numbers.
    pub fn new(z: u32, n: u32) -> Result<Self, KshError> {
        if z as usize >= PERIODIC_TABLE.len() {
            return Err(KshError::UnknownElement(
                ErrorInfo::new("element-out-of-range", "proton number beyond the table")
                    .with_context("z", z.to_string()),
            ));
        }
        Ok(Self { z, n })
    }

    /// Builds an identifier from proton and mass numbers.
    pub fn from_z_a(z: u32, a: u32) -> Result<Self, KshError> {
        if a < z {
            return Err(KshError::Format(
                ErrorInfo::new("mass-below-charge", "mass number smaller than proton number")
                    .with_context("z", z.to_string())
                    .with_context("a", a.to_string()),
            ));
        }
        Self::new(z, a - z)
    }

    /// Proton number.
    pub fn z(&self) -> u32 {
        self.z
    }

    /// Neutron number.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Mass number.
    pub fn a(&self) -> u32 {
        self.z + self.n
    }

    /// True for odd mass numbers; drives the unspecified-J file codes.
    pub fn is_odd_mass(&self) -> bool {
        self.a() % 2 == 1
    }

    /// Element symbol for the proton number.
    pub fn symbol(&self) -> &'static str {
        PERIODIC_TABLE[self.z as usize]
    }

    /// Returns the nucleus reached by adding `dz` protons and `dn` neutrons.
    pub fn shifted(&self, dz: i32, dn: i32) -> Result<Self, KshError> {
        let z = i64::from(self.z) + i64::from(dz);
        let n = i64::from(self.n) + i64::from(dn);
        if z < 0 || n < 0 {
            return Err(KshError::Format(
                ErrorInfo::new("negative-nucleon-count", "shift leaves a negative count")
                    .with_context("nuclide", self.to_string())
                    .with_context("dz", dz.to_string())
                    .with_context("dn", dn.to_string()),
            ));
        }
        Self::new(z as u32, n as u32)
    }
}

/// Renders `symbol + A` with no separator, e.g. `nuclide_name(8, 18) == "O18"`.
pub fn nuclide_name(z: u32, a: u32) -> Result<String, KshError> {
    Ok(NuclideId::from_z_a(z, a)?.to_string())
}

impl fmt::Display for NuclideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol(), self.a())
    }
}

impl FromStr for NuclideId {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let format_error = |message: &str| {
            KshError::Format(
                ErrorInfo::new("nuclide-format", message).with_context("input", text),
            )
        };
        let start = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| format_error("nuclide has no mass number"))?;
        let end = text[start..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(text.len(), |offset| start + offset);
        let a: u32 = text[start..end]
            .parse()
            .map_err(|_| format_error("mass number out of range"))?;

        let letters: String = text[..start].chars().chain(text[end..].chars()).collect();
        let symbol = title_case(letters.trim());
        if symbol.is_empty() {
            return Err(format_error("nuclide has no element symbol"));
        }
        let z = PERIODIC_TABLE
            .iter()
            .position(|entry| *entry == symbol)
            .ok_or_else(|| {
                KshError::UnknownElement(
                    ErrorInfo::new("unknown-element", "symbol not in the periodic table")
                        .with_context("symbol", symbol.clone())
                        .with_context("input", text),
                )
            })?;
        NuclideId::from_z_a(z as u32, a)
    }
}

impl TryFrom<String> for NuclideId {
    type Error = KshError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NuclideId> for String {
    fn from(value: NuclideId) -> Self {
        value.to_string()
    }
}

fn title_case(symbol: &str) -> String {
    let lower = symbol.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
