//! Scratch API model types.

mod actions;
mod comment;
mod project;
mod stats;
mod studio;

pub use comment::*;
pub use project::*;
pub use stats::*;
pub use studio::*;
