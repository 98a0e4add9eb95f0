//! This crate is responsible for managing processes spawned
//! by this tool. It contains drivers for running the build script
//! and talking to the registry, git, and the CI environment, along
//! with the logging that ties their output together.

pub mod drivers;
pub mod logging;
