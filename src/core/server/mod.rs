pub mod artifact;
pub mod overrides;
pub mod properties;

pub use artifact::{resolve_artifact, resolve_with_sidecar};
pub use overrides::{merge_overrides, MergeReport};
pub use properties::PropertyFile;
