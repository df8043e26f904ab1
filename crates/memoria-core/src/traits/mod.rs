//! Core traits for memoria providers.

mod generator;

pub use generator::*;
