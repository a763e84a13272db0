pub mod detect;
pub mod requirement;

pub use detect::{detect_installed_runtime_major, parse_runtime_major, satisfies_requirement};
pub use requirement::required_runtime_major;
