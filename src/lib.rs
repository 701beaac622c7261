pub mod analyzer;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod expiry;
pub mod fill;
pub mod normalize;
pub mod rules;
pub mod scan;
pub mod session;

pub use error::{FillscanError, Result};
