pub mod engine;
pub mod r2star;
pub mod stack;

pub use engine::{fit, FitResult, LocationFit, Rejection};
pub use r2star::{r2star_map, R2StarMap};
pub use stack::SignalStack;
