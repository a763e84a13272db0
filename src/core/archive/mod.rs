pub mod classifier;
pub mod extract;

pub use classifier::{classify, find_manifest, find_start_script, Classification};
pub use extract::extract_zip;
