//! Core data model for memoria.

mod record;
mod result;
mod source;

pub use record::*;
pub use result::*;
pub use source::*;
