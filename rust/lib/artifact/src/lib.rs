//! Fitted model artifacts: feature scalers and regressors loaded from JSON.
//!
//! Artifacts are immutable once loaded. [`ArtifactSet`] bundles a regressor
//! with its input and output scalers and checks that their shapes agree.

pub mod error;
pub mod loader;
pub mod regressor;
pub mod scaler;
pub mod traits;
pub mod tree;

pub use error::ArtifactError;
pub use loader::{ArtifactPaths, ArtifactSet};
pub use regressor::{Combine, LinearRegressor, Regressor, TreeEnsemble};
pub use scaler::{MinMaxScaler, Scaler, StandardScaler};
pub use traits::{Predict, Transform};
pub use tree::Tree;
