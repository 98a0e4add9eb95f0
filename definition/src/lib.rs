//! The declarative side of a deployment: which containers exist,
//! what their metadata files say, where the defaults repository
//! lives, and which tag a build gets.

pub mod container;
pub mod error;
pub mod metadata;
pub mod repository;
pub mod tag;

pub use container::*;
pub use error::*;
pub use metadata::*;
pub use repository::*;
pub use tag::*;
