//! Facts to verify and the lexical patterns that express their predicates.
//!
//! Both are produced outside this crate (fact loading, pattern mining) and are
//! read-only here.

pub mod error;
pub mod model;
pub mod pattern;


pub use error::{PatternError, PatternResult};
pub use model::{Fact, Labels};
pub use pattern::{Pattern, PatternStore};
