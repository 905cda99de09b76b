//! State labels and their three encodings: human text ("1.5-2"), doubled
//! angular momentum, and the solver's file codes ("j3n", "m1p").

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KshError};

fn format_error(code: &str, message: &str, input: &str) -> KshError {
    KshError::Format(ErrorInfo::new(code, message).with_context("input", input))
}

/// Total angular momentum stored doubled, so half-integers stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Spin(u32);

impl Spin {
    /// Creates a spin from its doubled value (`2J`).
    pub const fn from_twice(j2: u32) -> Self {
        Self(j2)
    }

    /// Returns `2J`.
    pub const fn twice(&self) -> u32 {
        self.0
    }

    /// Returns `J` as a float.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// True when `2J` is odd.
    pub const fn is_half_integer(&self) -> bool {
        self.0 % 2 == 1
    }

    /// Decimal rendering used in state requests: `1.5`, `2`.
    pub fn decimal(&self) -> String {
        if self.is_half_integer() {
            format!("{}.5", self.0 / 2)
        } else {
            (self.0 / 2).to_string()
        }
    }
}

/// Fraction rendering used in solver summaries: `3/2`, `2`.
impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_half_integer() {
            write!(f, "{}/2", self.0)
        } else {
            write!(f, "{}", self.0 / 2)
        }
    }
}

impl FromStr for Spin {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if let Some(numerator) = trimmed.strip_suffix("/2") {
            return numerator
                .parse::<u32>()
                .map(Spin)
                .map_err(|_| format_error("spin-format", "unparseable spin numerator", text));
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| format_error("spin-format", "unparseable spin", text))?;
        let doubled = 2.0 * value;
        if !doubled.is_finite()
            || doubled < 0.0
            || doubled.fract() != 0.0
            || doubled > f64::from(u32::MAX)
        {
            return Err(format_error(
                "spin-format",
                "spin must be a non-negative integer or half-integer",
                text,
            ));
        }
        Ok(Spin(doubled as u32))
    }
}

/// Spatial parity of a state or operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parity {
    /// Even parity, `+`.
    #[serde(rename = "+")]
    Plus,
    /// Odd parity, `-`.
    #[serde(rename = "-")]
    Minus,
}

impl Parity {
    /// Maps the solver's integer encoding (`1` / `-1`).
    pub fn from_sign(sign: i64) -> Self {
        if sign == 1 {
            Parity::Plus
        } else {
            Parity::Minus
        }
    }

    /// Suffix character used in file codes.
    pub fn file_char(&self) -> char {
        match self {
            Parity::Plus => 'p',
            Parity::Minus => 'n',
        }
    }

    /// Sign character used in labels.
    pub fn symbol(&self) -> char {
        match self {
            Parity::Plus => '+',
            Parity::Minus => '-',
        }
    }
}

impl Mul for Parity {
    type Output = Parity;

    fn mul(self, rhs: Parity) -> Parity {
        if self == rhs {
            Parity::Plus
        } else {
            Parity::Minus
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Parity {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "+" | "1" | "+1" => Ok(Parity::Plus),
            "-" | "-1" => Ok(Parity::Minus),
            _ => Err(format_error("parity-format", "parity must be + or -", text)),
        }
    }
}

/// `(J, parity, index)` triple identifying one state.
///
/// `j` is `None` for runs that only fixed the parity. Inside a run's
/// request list the index is the number of states asked for in that
/// block; everywhere else it is the 1-based ordinal within the block.
/// The derived ordering is structural (usable as a map key) and says
/// nothing about energies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateLabel {
    /// Angular momentum, absent for parity-only requests.
    pub j: Option<Spin>,
    /// Parity of the block.
    pub parity: Parity,
    /// Ordinal within the block (or count, for requests).
    pub index: u32,
}

impl StateLabel {
    /// Creates a label with a definite angular momentum.
    pub fn new(j: Spin, parity: Parity, index: u32) -> Self {
        Self {
            j: Some(j),
            parity,
            index,
        }
    }

    /// Creates a parity-only label.
    pub fn parity_only(parity: Parity, index: u32) -> Self {
        Self {
            j: None,
            parity,
            index,
        }
    }

    /// Same block, different ordinal.
    pub fn with_index(&self, index: u32) -> Self {
        Self { index, ..*self }
    }

    /// Solver file code: `j{2J}{p|n}`, or `m{0|1}{p|n}` for parity-only runs
    /// where the digit follows the owning nuclide's mass parity.
    pub fn file_code(&self, is_odd_mass: bool) -> String {
        match self.j {
            Some(spin) => format!("j{}{}", spin.twice(), self.parity.file_char()),
            None => format!(
                "m{}{}",
                if is_odd_mass { 1 } else { 0 },
                self.parity.file_char()
            ),
        }
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(spin) = self.j {
            write!(f, "{}", spin.decimal())?;
        }
        write!(f, "{}{}", self.parity, self.index)
    }
}

impl FromStr for StateLabel {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| c == '+' || c == '-')
            .ok_or_else(|| format_error("state-format", "state needs a + or - parity", text))?;
        let parity: Parity = trimmed[split..split + 1].parse()?;
        let j_text = &trimmed[..split];
        let j = if j_text.is_empty() {
            None
        } else {
            Some(j_text.parse::<Spin>()?)
        };
        let index: u32 = trimmed[split + 1..]
            .parse()
            .map_err(|_| format_error("state-format", "unparseable state index", text))?;
        if index == 0 {
            return Err(format_error("state-format", "state index starts at 1", text));
        }
        Ok(Self { j, parity, index })
    }
}

impl TryFrom<String> for StateLabel {
    type Error = KshError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateLabel> for String {
    fn from(value: StateLabel) -> Self {
        value.to_string()
    }
}

/// Parses a comma separated request list such as `"0+3,2+2"` or `"+10,-10"`.
pub fn parse_state_list(text: &str) -> Result<Vec<StateLabel>, KshError> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

/// Joins labels back into the comma separated request form.
pub fn join_state_list(states: &[StateLabel]) -> String {
    states
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
