//! Canonical bra/ket ordering between two runs.

use ksh_core::NuclideId;
use ksh_run::RunDescriptor;

/// True when `candidate` must sit on the bra side against `other`: more
/// protons, or as many protons and more nucleons.
pub fn is_heavier(candidate: NuclideId, other: NuclideId) -> bool {
    candidate.z() > other.z() || (candidate.z() == other.z() && candidate.a() > other.a())
}

/// Outcome of [`order`]: the two runs in bra/ket order plus whether the
/// caller's (left, right) order had to be swapped.
#[derive(Debug, Clone, Copy)]
pub struct Ordered<'a> {
    /// Heavier run.
    pub bra: &'a RunDescriptor,
    /// Lighter run, or the right-hand run when both weigh the same.
    pub ket: &'a RunDescriptor,
    /// True when `bra` was passed as the right-hand argument.
    pub flipped: bool,
}

impl<'a> Ordered<'a> {
    /// Puts a (left, right) pair of per-side values into (bra, ket) order.
    pub fn orient<T>(&self, left: T, right: T) -> (T, T) {
        if self.flipped {
            (right, left)
        } else {
            (left, right)
        }
    }

    /// True when both sides are the same run configuration, so bra and ket
    /// read the same wavefunctions.
    pub fn is_intra_nuclide(&self) -> bool {
        self.bra.same_system(self.ket)
    }
}

/// Orders two runs so the heavier one is the bra. Ties keep `left` as bra.
pub fn order<'a>(left: &'a RunDescriptor, right: &'a RunDescriptor) -> Ordered<'a> {
    if is_heavier(right.nuclide(), left.nuclide()) {
        Ordered {
            bra: right,
            ket: left,
            flipped: true,
        }
    } else {
        Ordered {
            bra: left,
            ket: right,
            flipped: false,
        }
    }
}
