//! Command implementations for the fillscan CLI

mod expiry;
mod inspect;
mod rules;
mod scan;

pub use expiry::*;
pub use inspect::*;
pub use rules::*;
pub use scan::*;
