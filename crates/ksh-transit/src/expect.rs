//! Expectation values and transition matrix elements between single states.

use ksh_core::errors::KshError;
use ksh_core::StateLabel;
use ksh_run::RunDescriptor;
use tracing::debug;

use crate::density::{DensityFileKey, DensityKind};
use crate::evaluator::{DensityEvaluator, OperatorSpec};

/// `<left_state| O |right_state>` with each state owned by its run.
///
/// State indices are eigenvector ordinals; callers do not need to care
/// which side the orderer makes the bra.
#[derive(Debug, Clone, Copy)]
pub struct MatrixElementRequest<'a> {
    /// Caller's left run.
    pub left: &'a RunDescriptor,
    /// State of the left run.
    pub left_state: StateLabel,
    /// Caller's right run.
    pub right: &'a RunDescriptor,
    /// State of the right run.
    pub right_state: StateLabel,
}

impl<'a> MatrixElementRequest<'a> {
    /// Diagonal request within one run.
    pub fn diagonal(run: &'a RunDescriptor, state: StateLabel) -> Self {
        Self {
            left: run,
            left_state: state,
            right: run,
            right_state: state,
        }
    }

    /// Canonical density key of the request.
    pub fn key(&self) -> DensityFileKey<'a> {
        DensityFileKey::new(
            self.left,
            self.left_state,
            self.right,
            self.right_state,
            DensityKind::Density,
        )
    }
}

/// Evaluates one request: the evaluator sees the states in bra/ket order.
pub fn matrix_element(
    request: &MatrixElementRequest<'_>,
    evaluator: &dyn DensityEvaluator,
    operator: &OperatorSpec,
) -> Result<f64, KshError> {
    let key = request.key();
    let file = key.filename();
    debug!(density = %file, flipped = key.flipped(), "evaluating matrix element");
    evaluator.amplitude(&file, &key.bra_state(), &key.ket_state(), operator)
}

/// Evaluates every request in order.
pub fn expectation_values(
    requests: &[MatrixElementRequest<'_>],
    evaluator: &dyn DensityEvaluator,
    operator: &OperatorSpec,
) -> Result<Vec<f64>, KshError> {
    requests
        .iter()
        .map(|request| matrix_element(request, evaluator, operator))
        .collect()
}
