//! Persisted probability-of-default model: classifier, scaler, and the
//! load/save contract for the artifact that carries them.

mod artifact;
mod classifier;
mod scaler;
pub mod store;

pub use artifact::{LoadedModel, ModelArtifact};
pub use classifier::{Classifier, RegressionTree, TreeNode};
pub use scaler::StandardScaler;
pub use store::{ModelLoad, ModelStoreError};
