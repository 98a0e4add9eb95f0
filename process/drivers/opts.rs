pub use build::*;
pub use registry::*;
pub use vcs::*;

mod build;
mod registry;
mod vcs;
