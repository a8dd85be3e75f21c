use crate::error::ArtifactError;

/// A fitted, invertible per-feature transform.
///
/// Implementations are immutable after loading and safe to share
/// across threads without locking.
pub trait Transform: Send + Sync {
    /// Number of dimensions the transform was fit on.
    fn dim(&self) -> usize;

    /// Map raw values into the normalized space.
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError>;

    /// Map normalized values back into raw units.
    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError>;
}

/// A fitted single-output regressor.
pub trait Predict: Send + Sync {
    /// Number of input features the model expects.
    fn num_features(&self) -> usize;

    /// Predict one scalar from one feature row.
    fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError>;
}

pub(crate) fn check_len(expected: usize, values: &[f64]) -> Result<(), ArtifactError> {
    if values.len() != expected {
        return Err(ArtifactError::Shape {
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}
