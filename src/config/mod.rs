pub mod model;
pub mod policy;

pub use model::ModelConfig;
pub use policy::{ParsePolicy, PolicyMode, TierSet, VolumeRange};
