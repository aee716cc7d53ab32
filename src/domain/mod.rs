//! Report domain model: operators, statuses and mutant records.

pub mod mutant;
pub mod mutator;
pub mod status;

pub use mutant::{Mutant, java_source_path};
pub use mutator::Mutator;
pub use status::MutantStatus;
