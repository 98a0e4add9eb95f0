mod ci;
mod drivers;

pub use ci::*;
pub use drivers::*;
