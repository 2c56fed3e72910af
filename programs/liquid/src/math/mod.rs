pub mod fees;
pub mod fixed_point;

pub use fees::*;
pub use fixed_point::*;
