//! Error and confidence types shared across the engine

use serde::Serialize;
use thiserror::Error;

/// Errors raised at the engine boundary
///
/// Everything here is detected before any solver runs. Degraded but usable
/// results (non-convergence, off-orbit queries) are not errors; they are
/// reported through [`Confidence`] and the query result types instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    /// An orbital element is outside its valid domain
    #[error("invalid orbital elements: {field} {reason}")]
    InvalidElements { field: &'static str, reason: String },

    /// A path needs at least two samples to form a closed polyline
    #[error("invalid sample count {requested}: at least 2 points are required")]
    InvalidSampleCount { requested: usize },

    /// A query point or elapsed time was NaN or infinite
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl OrbitError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidElements {
            field,
            reason: reason.into(),
        }
    }
}

pub type OrbitResult<T> = Result<T, OrbitError>;

/// How much a computed value can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Solver converged within tolerance
    #[default]
    Nominal,
    /// Best available estimate after the solver ran out of iterations
    Low,
}

impl Confidence {
    pub fn is_low(&self) -> bool {
        matches!(self, Self::Low)
    }

    /// Combine two confidences, keeping the weaker one
    pub fn min(self, other: Confidence) -> Confidence {
        if self.is_low() || other.is_low() {
            Confidence::Low
        } else {
            Confidence::Nominal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_min() {
        assert_eq!(Confidence::Nominal.min(Confidence::Nominal), Confidence::Nominal);
        assert_eq!(Confidence::Nominal.min(Confidence::Low), Confidence::Low);
        assert_eq!(Confidence::Low.min(Confidence::Nominal), Confidence::Low);
    }

    #[test]
    fn test_error_messages() {
        let err = OrbitError::invalid("eccentricity", "must be in [0, 1), got 1.2");
        assert_eq!(
            err.to_string(),
            "invalid orbital elements: eccentricity must be in [0, 1), got 1.2"
        );

        let err = OrbitError::InvalidSampleCount { requested: 1 };
        assert!(err.to_string().contains("at least 2"));
    }
}
