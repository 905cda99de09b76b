//! Spectroscopic-factor reports and effective single-particle energies.
//!
//! A report lists, per orbit, a table of transfer transitions. Each orbit
//! starts with an `orbit :` line carrying `n l 2j pn` and its table starts
//! after the fixed column header; a blank line closes the table. Rows read
//!
//! ```text
//!  1(   1)   -10.000    0(   1)   -12.000    2.000    0.800
//! ```
//!
//! i.e. `2Jf(if) Ef 2Ji(ii) Ei Ex C^2S`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ksh_core::errors::{ErrorInfo, KshError};
use ksh_core::NuclideId;
use ksh_run::InteractionService;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::orchestrate::PairPlan;

/// Column header that opens a transfer table.
pub const TABLE_HEADER: &str = " 2xJf      Ef      2xJi     Ei       Ex       C^2*S";

const ORBIT_PREFIX: &str = "orbit :";

/// Single-particle orbit `(n, l, 2j, pn)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrbitLabel {
    /// Radial quantum number.
    pub n: u32,
    /// Orbital angular momentum.
    pub l: u32,
    /// Doubled total angular momentum.
    pub j2: u32,
    /// Isospin projection tag as printed by the tool.
    pub pn: i32,
}

/// Accumulated strength of one orbit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitStrength {
    /// Sum of spectroscopic factors.
    pub sum_sf: f64,
    /// Strength-weighted energy, `sum C^2S / (2j+1) * (E_bra - E_ket)`.
    pub centroid: f64,
}

impl OrbitStrength {
    fn add(&mut self, other: &OrbitStrength) {
        self.sum_sf += other.sum_sf;
        self.centroid += other.centroid;
    }
}

/// Per-orbit strengths of one or more reports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrengthReport {
    /// Strength per orbit.
    pub orbits: BTreeMap<OrbitLabel, OrbitStrength>,
}

impl StrengthReport {
    /// Strength of one orbit.
    pub fn get(&self, orbit: &OrbitLabel) -> Option<&OrbitStrength> {
        self.orbits.get(orbit)
    }

    /// Adds another report orbit by orbit.
    pub fn absorb(&mut self, other: &StrengthReport) {
        for (orbit, strength) in &other.orbits {
            self.orbits.entry(*orbit).or_default().add(strength);
        }
    }
}

fn format_error(code: &str, message: &str, line_no: usize, line: &str) -> KshError {
    KshError::Format(
        ErrorInfo::new(code, message)
            .with_context("line", (line_no + 1).to_string())
            .with_context("text", line.trim()),
    )
}

fn parse_orbit(line: &str, line_no: usize) -> Result<OrbitLabel, KshError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let value = |idx: usize| fields.get(idx).and_then(|field| field.parse::<i64>().ok());
    match (value(2), value(3), value(4), value(5)) {
        (Some(n), Some(l), Some(j2), Some(pn)) if n >= 0 && l >= 0 && j2 >= 0 => {
            Ok(OrbitLabel {
                n: n as u32,
                l: l as u32,
                j2: j2 as u32,
                pn: pn as i32,
            })
        }
        _ => Err(format_error(
            "orbit-line",
            "orbit line needs n, l, 2j and pn",
            line_no,
            line,
        )),
    }
}

struct TransferRow {
    bra_index: u32,
    bra_energy: f64,
    ket_index: u32,
    ket_energy: f64,
    c2s: f64,
}

fn ordinal(token: &str) -> Option<u32> {
    token.strip_suffix(')')?.trim().parse().ok()
}

fn parse_row(line: &str) -> Option<TransferRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }
    Some(TransferRow {
        bra_index: ordinal(fields[1])?,
        bra_energy: fields[2].parse().ok()?,
        ket_index: ordinal(fields[4])?,
        ket_energy: fields[5].parse().ok()?,
        c2s: fields[7].parse().ok()?,
    })
}

/// Parses a spectroscopic-factor report.
///
/// Energies are shifted by each side's zero-body term. With `max_states`
/// set, rows involving a higher eigenvector ordinal on either side are
/// ignored.
pub fn parse_strength_report(
    text: &str,
    bra: &dyn InteractionService,
    ket: &dyn InteractionService,
    max_states: Option<u32>,
) -> Result<StrengthReport, KshError> {
    let bra_offset = bra.zero_body_energy();
    let ket_offset = ket.zero_body_energy();
    let mut report = StrengthReport::default();
    let mut orbit: Option<OrbitLabel> = None;
    let mut table: Option<OrbitStrength> = None;

    let mut close = |orbit: Option<OrbitLabel>, table: OrbitStrength, line_no: usize| {
        match orbit {
            Some(label) => {
                report.orbits.insert(label, table);
                Ok(())
            }
            None => Err(format_error(
                "orbit-missing",
                "transfer table without a preceding orbit line",
                line_no,
                "",
            )),
        }
    };

    for (line_no, line) in text.lines().enumerate() {
        if line.starts_with(ORBIT_PREFIX) {
            orbit = Some(parse_orbit(line, line_no)?);
            continue;
        }
        if line.starts_with(TABLE_HEADER) {
            table = Some(OrbitStrength::default());
            continue;
        }
        let Some(acc) = table.as_mut() else {
            continue;
        };
        if line.trim().is_empty() {
            if let Some(done) = table.take() {
                close(orbit, done, line_no)?;
            }
            continue;
        }
        let row = parse_row(line).ok_or_else(|| {
            format_error("transfer-row", "unparseable transfer row", line_no, line)
        })?;
        if let Some(limit) = max_states {
            if row.bra_index > limit || row.ket_index > limit {
                continue;
            }
        }
        let j2 = orbit.map_or(0, |label| label.j2);
        let weight = row.c2s / f64::from(j2 + 1);
        acc.sum_sf += row.c2s;
        acc.centroid += weight * ((row.bra_energy + bra_offset) - (row.ket_energy + ket_offset));
    }
    if let Some(done) = table.take() {
        close(orbit, done, text.lines().count())?;
    }
    Ok(report)
}

/// Reads and parses a report from disk.
pub fn read_strength_report(
    path: &Path,
    bra: &dyn InteractionService,
    ket: &dyn InteractionService,
    max_states: Option<u32>,
) -> Result<StrengthReport, KshError> {
    if !path.exists() {
        return Err(KshError::MissingArtifact(
            ErrorInfo::new("strength-missing", "strength report not produced yet")
                .with_context("path", path.display().to_string()),
        ));
    }
    let text = fs::read_to_string(path)
        .map_err(|err| KshError::io("strength_read", path.display(), err))?;
    parse_strength_report(&text, bra, ket, max_states)
}

/// Sums reports orbit by orbit.
pub fn aggregate_espe(reports: &[StrengthReport]) -> StrengthReport {
    let mut total = StrengthReport::default();
    for report in reports {
        total.absorb(report);
    }
    total
}

/// Which one-nucleon neighbours contribute to the ESPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EspeMode {
    /// Removal: `(Z-1, N)` and `(Z, N-1)`.
    Hole,
    /// Addition: `(Z+1, N)` and `(Z, N+1)`.
    Particle,
    /// All four neighbours.
    Both,
}

impl std::str::FromStr for EspeMode {
    type Err = KshError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "hole" => Ok(EspeMode::Hole),
            "particle" => Ok(EspeMode::Particle),
            "both" => Ok(EspeMode::Both),
            other => Err(KshError::Format(
                ErrorInfo::new("espe-mode", "unknown ESPE mode")
                    .with_context("input", other)
                    .with_hint("expected hole, particle or both"),
            )),
        }
    }
}

/// Neighbouring nuclides in the order `(Z-1,N)`, `(Z,N-1)`, `(Z+1,N)`, `(Z,N+1)`
/// restricted to `mode`.
pub fn espe_neighbours(target: NuclideId, mode: EspeMode) -> Result<Vec<NuclideId>, KshError> {
    let shifts: &[(i32, i32)] = match mode {
        EspeMode::Hole => &[(-1, 0), (0, -1)],
        EspeMode::Particle => &[(1, 0), (0, 1)],
        EspeMode::Both => &[(-1, 0), (0, -1), (1, 0), (0, 1)],
    };
    shifts
        .iter()
        .map(|(dz, dn)| target.shifted(*dz, *dn))
        .collect()
}

/// Reads every strength report of a plan and sums them.
///
/// `left` and `right` are the services of the runs the plan was built
/// from; they are swapped when the plan flipped. Reports that are not
/// written yet are skipped with a warning.
pub fn strength_from_plan(
    plan: &PairPlan,
    dir: &Path,
    left: &dyn InteractionService,
    right: &dyn InteractionService,
    max_states: Option<u32>,
) -> Result<StrengthReport, KshError> {
    let (bra, ket) = if plan.flipped() {
        (right, left)
    } else {
        (left, right)
    };
    let mut total = StrengthReport::default();
    for job in plan.jobs() {
        match read_strength_report(&dir.join(&job.density_file), bra, ket, max_states) {
            Ok(report) => {
                debug!(file = %job.density_file, orbits = report.orbits.len(), "strength report read");
                total.absorb(&report);
            }
            Err(err) if err.is_missing_artifact() => {
                warn!(file = %job.density_file, "strength report not ready, skipped");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(total)
}
